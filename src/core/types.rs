//! Core value types shared by the graph, path and storage modules.

use serde::{Deserialize, Serialize};

/// Node identifier, allocated by the graph store in increasing order from 0
pub type NodeId = u64;

/// Geographic position of a waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

impl Position {
    /// Create a position from latitude and longitude
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both coordinates differ by strictly less than `tolerance`.
    pub fn approx_eq(&self, other: &Position, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() < tolerance && (self.lng - other.lng).abs() < tolerance
    }
}

/// A waypoint: identifier plus position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier
    pub id: NodeId,
    /// Node position
    pub position: Position,
}

/// An undirected weighted edge as seen from outside the store.
///
/// Serializes as the `[n1, n2, weight]` triple used by the graph query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(NodeId, NodeId, f64)", into = "(NodeId, NodeId, f64)")]
pub struct EdgeRecord {
    /// First endpoint, as given when the edge was added
    pub n1: NodeId,
    /// Second endpoint
    pub n2: NodeId,
    /// Edge weight (distance or cost)
    pub weight: f64,
}

impl EdgeRecord {
    /// Create an edge record
    pub fn new(n1: NodeId, n2: NodeId, weight: f64) -> Self {
        Self { n1, n2, weight }
    }
}

impl From<(NodeId, NodeId, f64)> for EdgeRecord {
    fn from((n1, n2, weight): (NodeId, NodeId, f64)) -> Self {
        Self { n1, n2, weight }
    }
}

impl From<EdgeRecord> for (NodeId, NodeId, f64) {
    fn from(edge: EdgeRecord) -> Self {
        (edge.n1, edge.n2, edge.weight)
    }
}
