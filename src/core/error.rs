//! Error types and handling for the waypoint graph
//!
//! This module defines all error types used throughout the system. Graph and
//! import failures are recoverable and reported to callers as structured
//! values; node matching failures during import are collected rather than
//! propagated.

use crate::core::types::NodeId;
use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the waypoint graph
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Graph operation errors
    #[error("Graph operation error: {0}")]
    Graph(#[from] GraphError),

    /// Flat file import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Graph operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An edge between the two nodes is already present, in either orientation
    #[error("Edge already exists: {n1} -- {n2}")]
    EdgeAlreadyExists {
        /// First endpoint
        n1: NodeId,
        /// Second endpoint
        n2: NodeId,
    },

    /// No edge between the two nodes
    #[error("Edge not found: {n1} -- {n2}")]
    EdgeNotFound {
        /// First endpoint
        n1: NodeId,
        /// Second endpoint
        n2: NodeId,
    },

    /// The endpoints are disconnected or one of them does not exist
    #[error("No path exists between {start} and {end}")]
    NoPathExists {
        /// Requested start node
        start: NodeId,
        /// Requested end node
        end: NodeId,
    },

    /// Node not found
    #[error("Node not found: {id}")]
    NodeNotFound {
        /// ID of the missing node
        id: NodeId,
    },

    /// Edge from a node to itself
    #[error("Self-loop on node {id} is not allowed")]
    SelfLoop {
        /// The node on both ends
        id: NodeId,
    },

    /// Weight is negative, infinite or NaN
    #[error("Invalid edge weight: {weight}")]
    InvalidWeight {
        /// The rejected weight
        weight: f64,
    },
}

/// Reasons an imported edge record was skipped.
///
/// These never abort an import; they are collected in the import report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    /// No node record (or no graph node) matches the referenced line ordinal
    #[error("No node matches record index {index}")]
    NodeMatchFailed {
        /// Line ordinal among node records
        index: usize,
    },

    /// More than one graph node lies within tolerance of the record position
    #[error("Record index {index} matches several nodes: {candidates:?}")]
    AmbiguousNodeMatch {
        /// Line ordinal among node records
        index: usize,
        /// Node ids within tolerance
        candidates: Vec<NodeId>,
    },

    /// Both endpoints resolved but the store refused the edge
    #[error("Edge rejected: {0}")]
    EdgeRejected(GraphError),
}

/// Whole-import failures. The store is left untouched when these occur.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    /// Input exceeds the configured size bound
    #[error("Input too large: {size} bytes (max: {max})")]
    InputTooLarge {
        /// Actual input size in bytes
        size: usize,
        /// Maximum accepted size in bytes
        max: usize,
    },

    /// Input is not UTF-8 text
    #[error("Input is not valid UTF-8 text")]
    InvalidUtf8,
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if this is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::Graph(_) | Error::Import(_)
        )
    }

    /// Check if this is a server error (5xx equivalent)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Io(_))
    }
}
