//! Waypoint Graph - weighted geographic graph service
//!
//! Keeps an in-memory undirected graph whose nodes are latitude/longitude
//! waypoints and whose edges carry a weight. Clients add nodes and edges,
//! query edge weights and shortest paths, and move the whole graph in and out
//! through a flat text format. Import recovers node identity from coordinates
//! alone, matching within a configurable tolerance.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

// Main functional modules
pub mod graph;
pub mod storage;
pub mod api;

// Re-export commonly used items for convenience
pub use core::{AppState, Config, Error, GraphError, NodeId, Position, Result};
pub use graph::{GraphStore, PathFinder, Route, Snapshot};
pub use storage::{ImportOptions, ImportReport, Importer};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_logging(config: &core::config::LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.level))
        .map_err(|e| Error::config(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format.as_str() {
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    };
    installed.map_err(|e| Error::config(format!("Logging already initialized: {}", e)))?;

    tracing::info!("Initializing {} v{}", NAME, VERSION);
    Ok(())
}
