//! # API Module
//!
//! HTTP interface to the shared waypoint graph.
//!
//! ## Endpoints Overview
//!
//! ### Graph Operations
//! - `POST /add_node` - Add a node at `{lat, lng}`
//! - `POST /add_edge` - Connect `{node1, node2}` with `weight`
//! - `POST /get_edge_weight` - Weight of the edge between `{node1, node2}`
//! - `POST /shortest_path` - Minimum-weight path from `start` to `end`
//! - `GET /get_graph` - Nodes keyed by id and edge triples
//! - `POST /reset` - Clear the graph
//!
//! ### File Operations
//! - `GET /export_graph` - Download the graph in the flat text format
//! - `POST /import_graph` - Replace the graph from a flat text body
//!
//! ### System Essentials
//! - `GET /health` - Health check

pub mod handlers;
pub mod server;

// Re-export commonly used items
pub use server::{create_app, start_server};
