//! Minimum-weight routing over the waypoint graph.
//!
//! Dijkstra's algorithm with a binary-heap frontier, stopping as soon as the
//! destination is settled. Edge weights are assumed non-negative.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Serialize;

use crate::core::error::GraphError;
use crate::core::types::NodeId;
use crate::graph::store::GraphStore;

/// A resolved route between two nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Node ids from start to end, both inclusive
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along the route
    pub total_weight: f64,
}

impl Route {
    /// Each hop as `(from, to, weight)`, looked up in `store`
    pub fn legs<'a>(&'a self, store: &'a GraphStore) -> impl Iterator<Item = (NodeId, NodeId, f64)> + 'a {
        self.nodes.windows(2).map(move |pair| {
            let weight = store.edge_weight(pair[0], pair[1]).unwrap_or(f64::NAN);
            (pair[0], pair[1], weight)
        })
    }
}

/// Frontier entry. Ordered so that `BinaryHeap` pops the smallest distance.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    node: NodeId,
    distance: f64,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap; ties broken on the smaller id for determinism
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Compute the minimum-total-weight path from `start` to `end`.
///
/// # Errors
///
/// `NoPathExists` when either node is absent or the two lie in different
/// connected components.
pub fn shortest_path(store: &GraphStore, start: NodeId, end: NodeId) -> Result<Route, GraphError> {
    let no_path = GraphError::NoPathExists { start, end };
    if !store.contains_node(start) || !store.contains_node(end) {
        return Err(no_path);
    }
    if start == end {
        return Ok(Route {
            nodes: vec![start],
            total_weight: 0.0,
        });
    }

    let mut distances: HashMap<NodeId, f64> = HashMap::from([(start, 0.0)]);
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
    let mut settled: HashSet<NodeId> = HashSet::new();
    let mut frontier = BinaryHeap::from([Frontier {
        node: start,
        distance: 0.0,
    }]);

    while let Some(Frontier { node, distance }) = frontier.pop() {
        if !settled.insert(node) {
            continue;
        }
        if node == end {
            let mut nodes = vec![end];
            let mut cursor = end;
            while let Some(&parent) = came_from.get(&cursor) {
                nodes.push(parent);
                cursor = parent;
            }
            nodes.reverse();
            return Ok(Route {
                nodes,
                total_weight: distance,
            });
        }

        for (neighbor, weight) in store.neighbors(node) {
            if settled.contains(&neighbor) {
                continue;
            }
            let tentative = distance + weight;
            let best = distances.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if tentative < best {
                distances.insert(neighbor, tentative);
                came_from.insert(neighbor, node);
                frontier.push(Frontier {
                    node: neighbor,
                    distance: tentative,
                });
            }
        }
    }

    Err(no_path)
}

/// Route lookup bound to one store
pub struct PathFinder<'a> {
    store: &'a GraphStore,
}

impl<'a> PathFinder<'a> {
    /// Create a path finder over `store`
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Shortest route from `start` to `end`, logging each leg at debug level.
    pub fn route(&self, start: NodeId, end: NodeId) -> Result<Route, GraphError> {
        let route = shortest_path(self.store, start, end)?;
        tracing::debug!(?route.nodes, total = route.total_weight, "shortest path");
        for (from, to, weight) in route.legs(self.store) {
            tracing::debug!("{} --- {} ---> {}", from, weight, to);
        }
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(40.0, -3.0);
        store.add_node(41.0, -3.0);
        store.add_node(42.0, -3.0);
        store.add_edge(0, 1, 10.0).unwrap();
        store.add_edge(1, 2, 10.0).unwrap();
        store
    }

    #[test]
    fn follows_line() {
        let store = line_graph();
        let route = shortest_path(&store, 0, 2).unwrap();
        assert_eq!(route.nodes, vec![0, 1, 2]);
        assert_eq!(route.total_weight, 20.0);
        assert_eq!(
            route.legs(&store).collect::<Vec<_>>(),
            vec![(0, 1, 10.0), (1, 2, 10.0)]
        );
    }

    #[test]
    fn same_start_and_end_is_single_node() {
        let store = line_graph();
        let route = shortest_path(&store, 1, 1).unwrap();
        assert_eq!(route.nodes, vec![1]);
        assert_eq!(route.total_weight, 0.0);
    }

    #[test]
    fn prefers_lighter_detour() {
        let mut store = GraphStore::new();
        for i in 0..4 {
            store.add_node(i as f64, 0.0);
        }
        store.add_edge(0, 3, 50.0).unwrap();
        store.add_edge(0, 1, 5.0).unwrap();
        store.add_edge(1, 2, 5.0).unwrap();
        store.add_edge(2, 3, 5.0).unwrap();
        let route = PathFinder::new(&store).route(3, 0).unwrap();
        assert_eq!(route.nodes, vec![3, 2, 1, 0]);
        assert_eq!(route.total_weight, 15.0);
    }

    #[test]
    fn disconnected_nodes_have_no_path() {
        let mut store = GraphStore::new();
        store.add_node(40.0, -3.0);
        store.add_node(41.0, -3.0);
        store.add_node(42.0, -3.0);
        store.add_edge(0, 1, 10.0).unwrap();
        assert_eq!(
            shortest_path(&store, 0, 2),
            Err(GraphError::NoPathExists { start: 0, end: 2 })
        );
    }

    #[test]
    fn missing_endpoint_has_no_path() {
        let store = line_graph();
        assert_eq!(
            shortest_path(&store, 0, 9),
            Err(GraphError::NoPathExists { start: 0, end: 9 })
        );
        assert_eq!(
            shortest_path(&store, 9, 9),
            Err(GraphError::NoPathExists { start: 9, end: 9 })
        );
    }
}
