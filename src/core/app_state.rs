//! Shared application state
//!
//! One `GraphStore` per process, guarded by a single reader-writer lock.
//! Mutations (add node, add edge, reset, import) hold the write lock for
//! their whole duration, so an import is never observed half-applied.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::config::Config;
use crate::graph::GraphStore;
use crate::storage::Importer;

/// Graph store shared between request handlers
pub type SharedGraph = Arc<RwLock<GraphStore>>;

/// Central application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// The authoritative graph
    pub graph: SharedGraph,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create state with an empty graph
    pub fn new(config: Config) -> Self {
        Self {
            graph: Arc::new(RwLock::new(GraphStore::new())),
            config: Arc::new(config),
        }
    }

    /// Importer configured from the graph and storage settings
    pub fn importer(&self) -> crate::Result<Importer> {
        Importer::new(self.config.import_options())
    }
}
