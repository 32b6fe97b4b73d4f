//! Graph state and routing
//!
//! This module contains the authoritative waypoint graph and the shortest-path
//! query that runs over it.

pub mod store;
pub mod path;

// Re-export main graph types
pub use store::{GraphStore, Snapshot};
pub use path::{shortest_path, PathFinder, Route};
