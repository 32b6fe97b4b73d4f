//! Flat text export of the graph.
//!
//! One `lat lng` line per node in ascending id order, then one
//! `idx1 idx2 weight` line per edge in store order. Edge endpoints are written
//! as the ordinal of the endpoint's node line, which is what the importer
//! reads them as.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::core::error::Result;
use crate::core::types::NodeId;
use crate::graph::GraphStore;

/// Shortest round-trip float text that always keeps a decimal point or exponent
fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

/// Render the whole graph as a text document
pub fn export(store: &GraphStore) -> String {
    let mut out = String::new();
    let mut ordinals: HashMap<NodeId, usize> = HashMap::with_capacity(store.node_count());

    for (ordinal, node) in store.nodes().enumerate() {
        ordinals.insert(node.id, ordinal);
        let _ = writeln!(
            out,
            "{} {}",
            format_number(node.position.lat),
            format_number(node.position.lng)
        );
    }
    for edge in store.edges() {
        // Endpoints always exist, add_edge checks them
        let (Some(a), Some(b)) = (ordinals.get(&edge.n1), ordinals.get(&edge.n2)) else {
            continue;
        };
        let _ = writeln!(out, "{} {} {}", a, b, format_number(edge.weight));
    }
    out
}

/// Write the text document to `path`, creating missing parent directories.
///
/// Returns the document that was written.
pub fn export_to_file(store: &GraphStore, path: &Path) -> Result<String> {
    let document = export(store);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, &document)?;
    tracing::info!(
        "Exported {} nodes and {} edges to {:?}",
        store.node_count(),
        store.edge_count(),
        path
    );
    Ok(document)
}
