//! Authoritative in-memory waypoint graph.
//!
//! `GraphStore` owns every node and edge plus the node id allocator. Ids are
//! handed out in increasing order starting at 0 and are only reset by
//! [`GraphStore::clear`]. Edges are undirected: at most one edge exists per
//! unordered pair of nodes and self-loops are rejected.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::error::GraphError;
use crate::core::types::{EdgeRecord, Node, NodeId, Position};

/// Normalized key for an unordered node pair
type PairKey = (NodeId, NodeId);

fn pair_key(a: NodeId, b: NodeId) -> PairKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Read-only copy of the graph at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Node id to position, ascending by id
    pub nodes: BTreeMap<NodeId, Position>,
    /// Edges in store iteration order
    pub edges: Vec<EdgeRecord>,
}

/// In-memory graph of waypoints and weighted connections
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: BTreeMap<NodeId, Position>,
    /// Insertion-ordered edge list; export order follows it
    edges: Vec<EdgeRecord>,
    /// Pair -> position in `edges`
    edge_index: HashMap<PairKey, usize>,
    /// Node -> positions in `edges` of incident edges
    adjacency: HashMap<NodeId, Vec<usize>>,
    next_id: NodeId,
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next node id and store the position under it.
    pub fn add_node(&mut self, lat: f64, lng: f64) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, Position::new(lat, lng));
        tracing::trace!(id, lat, lng, "node added");
        id
    }

    /// Insert an undirected edge between two existing nodes.
    ///
    /// # Errors
    ///
    /// * `EdgeAlreadyExists` - an edge joins the pair in either orientation
    /// * `NodeNotFound` - either endpoint is not in the store
    /// * `SelfLoop` - both endpoints are the same node
    /// * `InvalidWeight` - the weight is negative or not finite
    pub fn add_edge(&mut self, n1: NodeId, n2: NodeId, weight: f64) -> Result<(), GraphError> {
        let key = pair_key(n1, n2);
        if self.edge_index.contains_key(&key) {
            return Err(GraphError::EdgeAlreadyExists { n1, n2 });
        }
        for id in [n1, n2] {
            if !self.nodes.contains_key(&id) {
                return Err(GraphError::NodeNotFound { id });
            }
        }
        if n1 == n2 {
            return Err(GraphError::SelfLoop { id: n1 });
        }
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(GraphError::InvalidWeight { weight });
        }

        let slot = self.edges.len();
        self.edges.push(EdgeRecord::new(n1, n2, weight));
        self.edge_index.insert(key, slot);
        self.adjacency.entry(n1).or_default().push(slot);
        self.adjacency.entry(n2).or_default().push(slot);
        tracing::trace!(n1, n2, weight, "edge added");
        Ok(())
    }

    /// Weight of the edge joining `n1` and `n2`, in either orientation.
    pub fn edge_weight(&self, n1: NodeId, n2: NodeId) -> Result<f64, GraphError> {
        self.edge_index
            .get(&pair_key(n1, n2))
            .map(|&slot| self.edges[slot].weight)
            .ok_or(GraphError::EdgeNotFound { n1, n2 })
    }

    /// Remove all nodes and edges and reset the id allocator to 0.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.edge_index.clear();
        self.adjacency.clear();
        self.next_id = 0;
    }

    /// Copy of all nodes and edges
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Position of a node, if present
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.nodes.get(&id).copied()
    }

    /// Whether a node with this id exists
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.nodes
            .iter()
            .map(|(&id, &position)| Node { id, position })
    }

    /// Edges in store iteration order
    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.edges.iter()
    }

    /// Neighbors of `id` with the weight of the connecting edge
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flatten()
            .map(move |&slot| {
                let edge = &self.edges[slot];
                let other = if edge.n1 == id { edge.n2 } else { edge.n1 };
                (other, edge.weight)
            })
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line_graph() -> GraphStore {
        let mut store = GraphStore::new();
        let a = store.add_node(40.0, -3.0);
        let b = store.add_node(41.0, -3.0);
        let c = store.add_node(42.0, -3.0);
        store.add_edge(a, b, 10.0).unwrap();
        store.add_edge(b, c, 10.0).unwrap();
        store
    }

    #[test]
    fn ids_start_at_zero_and_increase() {
        let mut store = GraphStore::new();
        assert_eq!(store.add_node(0.0, 0.0), 0);
        assert_eq!(store.add_node(1.0, 1.0), 1);
        assert_eq!(store.add_node(0.0, 0.0), 2);
        assert_eq!(store.snapshot().nodes.len(), 3);
    }

    #[test]
    fn duplicate_edge_rejected_in_either_orientation() {
        let mut store = line_graph();
        assert_eq!(
            store.add_edge(0, 1, 99.0),
            Err(GraphError::EdgeAlreadyExists { n1: 0, n2: 1 })
        );
        assert_eq!(
            store.add_edge(1, 0, 1.0),
            Err(GraphError::EdgeAlreadyExists { n1: 1, n2: 0 })
        );
        assert_eq!(store.edge_weight(0, 1), Ok(10.0));
        assert_eq!(store.edge_count(), 2);
    }

    #[test]
    fn edge_to_missing_node_rejected() {
        let mut store = line_graph();
        assert_eq!(
            store.add_edge(0, 7, 1.0),
            Err(GraphError::NodeNotFound { id: 7 })
        );
        assert_eq!(store.add_edge(2, 2, 1.0), Err(GraphError::SelfLoop { id: 2 }));
    }

    #[test]
    fn non_finite_and_negative_weights_rejected() {
        let mut store = line_graph();
        assert_eq!(
            store.add_edge(0, 2, f64::INFINITY),
            Err(GraphError::InvalidWeight { weight: f64::INFINITY })
        );
        assert!(matches!(
            store.add_edge(0, 2, f64::NAN),
            Err(GraphError::InvalidWeight { weight }) if weight.is_nan()
        ));
        assert_eq!(
            store.add_edge(0, 2, -1.0),
            Err(GraphError::InvalidWeight { weight: -1.0 })
        );
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.add_edge(0, 2, 0.0), Ok(()));
    }

    #[test]
    fn missing_edge_weight_is_not_found() {
        let store = line_graph();
        assert_eq!(
            store.edge_weight(0, 2),
            Err(GraphError::EdgeNotFound { n1: 0, n2: 2 })
        );
    }

    #[test]
    fn clear_resets_allocator() {
        let mut store = line_graph();
        store.clear();
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.neighbors(1).count(), 0);
        assert_eq!(store.add_node(5.0, 5.0), 0);
    }

    #[test]
    fn snapshot_keeps_edge_insertion_order() {
        let store = line_graph();
        let snapshot = store.snapshot();
        assert_eq!(
            snapshot.edges,
            vec![EdgeRecord::new(0, 1, 10.0), EdgeRecord::new(1, 2, 10.0)]
        );
        assert_eq!(snapshot.nodes[&1], Position::new(41.0, -3.0));
    }

    #[test]
    fn neighbors_lists_incident_edges() {
        let store = line_graph();
        let mut around_b: Vec<_> = store.neighbors(1).collect();
        around_b.sort_by_key(|&(id, _)| id);
        assert_eq!(around_b, vec![(0, 10.0), (2, 10.0)]);
    }

    proptest! {
        #[test]
        fn add_node_ids_strictly_increase(coords in prop::collection::vec((-90.0f64..90.0, -180.0f64..180.0), 1..64)) {
            let mut store = GraphStore::new();
            let ids: Vec<NodeId> = coords.iter().map(|&(lat, lng)| store.add_node(lat, lng)).collect();
            let expected: Vec<NodeId> = (0..coords.len() as NodeId).collect();
            prop_assert_eq!(ids, expected);
            prop_assert_eq!(store.snapshot().nodes.len(), coords.len());
        }

        #[test]
        fn edge_weight_is_symmetric(weight in 0.0f64..1.0e6, count in 2usize..16, a in 0usize..16, b in 0usize..16) {
            let mut store = GraphStore::new();
            for i in 0..count {
                store.add_node(i as f64, i as f64);
            }
            let (a, b) = ((a % count) as NodeId, (b % count) as NodeId);
            prop_assume!(a != b);
            store.add_edge(a, b, weight).unwrap();
            prop_assert_eq!(store.edge_weight(a, b), store.edge_weight(b, a));
            prop_assert_eq!(store.edge_weight(b, a), Ok(weight));
        }
    }
}
