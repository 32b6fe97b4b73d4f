//! Core system types and foundations
//!
//! This module contains the fundamental building blocks of the waypoint graph
//! service: type definitions, error handling, configuration and the shared
//! application state.

pub mod types;
pub mod error;
pub mod config;
pub mod app_state;
pub mod factory;

// Re-export commonly used items
pub use types::{EdgeRecord, Node, NodeId, Position};
pub use error::{Error, GraphError, ImportError, MatchError, Result};
pub use config::Config;
pub use app_state::{AppState, SharedGraph};
pub use factory::create_app_state;
