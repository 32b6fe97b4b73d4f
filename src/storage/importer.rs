//! Flat text import with coordinate-based node reconciliation.
//!
//! The serialized format carries no node ids: a node is known only by the
//! ordinal of its line among node lines and by its coordinates. Import clears
//! the target store, recreates every node record in file order, then resolves
//! each edge endpoint by scanning the store for the single node whose position
//! lies within tolerance of the referenced record. Edges that cannot be
//! resolved, or that the store refuses, are skipped and reported; they never
//! abort the import.

use serde::{Serialize, Serializer};

use crate::core::error::{Error, ImportError, MatchError};
use crate::core::types::{Node, NodeId, Position};
use crate::graph::GraphStore;

/// Default absolute tolerance for coordinate matching
pub const DEFAULT_MATCH_TOLERANCE: f64 = 1e-6;

/// Default bound on accepted input size (16 MiB)
pub const DEFAULT_MAX_IMPORT_BYTES: usize = 16 * 1024 * 1024;

/// Import tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    /// Absolute tolerance applied to both coordinates
    pub tolerance: f64,
    /// Inputs larger than this are rejected before the store is touched
    pub max_bytes: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_MATCH_TOLERANCE,
            max_bytes: DEFAULT_MAX_IMPORT_BYTES,
        }
    }
}

impl ImportOptions {
    /// Check that the tolerance is a positive finite number and the size bound is non-zero
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::config(format!(
                "Match tolerance must be a positive finite number, got {}",
                self.tolerance
            )));
        }
        if self.max_bytes == 0 {
            return Err(Error::config("Max import bytes must be greater than zero"));
        }
        Ok(())
    }
}

/// One parsed line of the text format
#[derive(Debug, Clone, Copy, PartialEq)]
enum Record {
    Node(Position),
    Edge { a: usize, b: usize, weight: f64 },
}

/// Classify a line by token count; anything else is `None`.
///
/// Edge weights are not range-checked here so that a bad weight is reported
/// as a skipped edge instead of vanishing with the unparseable lines.
fn parse_record(line: &str) -> Option<Record> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [lat, lng] => {
            let lat: f64 = lat.parse().ok()?;
            let lng: f64 = lng.parse().ok()?;
            (lat.is_finite() && lng.is_finite()).then(|| Record::Node(Position::new(lat, lng)))
        }
        [a, b, weight] => {
            Some(Record::Edge {
                a: a.parse().ok()?,
                b: b.parse().ok()?,
                weight: weight.parse().ok()?,
            })
        }
        _ => None,
    }
}

fn serialize_reason<S: Serializer>(reason: &MatchError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// An edge record that was not added to the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEdge {
    /// 1-based line number in the input
    pub line: usize,
    /// First endpoint as written (node line ordinal)
    pub n1: usize,
    /// Second endpoint as written
    pub n2: usize,
    /// Parsed weight
    pub weight: f64,
    /// Why it was skipped
    #[serde(serialize_with = "serialize_reason")]
    pub reason: MatchError,
}

/// Outcome of a successful import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Node records turned into graph nodes
    pub nodes_created: usize,
    /// Edge records added to the store
    pub edges_created: usize,
    /// Edge records that were skipped
    pub skipped: Vec<SkippedEdge>,
}

impl ImportReport {
    /// Whether every edge record made it into the store
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Rebuilds a `GraphStore` from the flat text format
#[derive(Debug, Clone, Default)]
pub struct Importer {
    options: ImportOptions,
}

impl Importer {
    /// Create an importer with the given options.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the options fail [`ImportOptions::validate`].
    pub fn new(options: ImportOptions) -> crate::Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Replace the contents of `store` with the graph described by `input`.
    ///
    /// The size and encoding checks run before the store is cleared; after
    /// that the import always succeeds, reporting skipped edges.
    pub fn import(&self, store: &mut GraphStore, input: &[u8]) -> Result<ImportReport, ImportError> {
        if input.len() > self.options.max_bytes {
            return Err(ImportError::InputTooLarge {
                size: input.len(),
                max: self.options.max_bytes,
            });
        }
        let text = std::str::from_utf8(input).map_err(|_| ImportError::InvalidUtf8)?;
        Ok(self.import_text(store, text))
    }

    /// Replace the contents of `store` with the graph described by `text`.
    pub fn import_text(&self, store: &mut GraphStore, text: &str) -> ImportReport {
        store.clear();

        let mut node_records = Vec::new();
        let mut edge_records = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            match parse_record(line) {
                Some(Record::Node(position)) => node_records.push(position),
                Some(Record::Edge { a, b, weight }) => edge_records.push((line_no + 1, a, b, weight)),
                None if !line.trim().is_empty() => {
                    tracing::debug!("Ignoring line {}: {:?}", line_no + 1, line);
                }
                None => {}
            }
        }

        let created: Vec<Node> = node_records
            .into_iter()
            .map(|position| Node {
                id: store.add_node(position.lat, position.lng),
                position,
            })
            .collect();

        let mut report = ImportReport {
            nodes_created: created.len(),
            ..ImportReport::default()
        };

        for (line, a, b, weight) in edge_records {
            let outcome = self.resolve(store, &created, a).and_then(|n1| {
                let n2 = self.resolve(store, &created, b)?;
                store
                    .add_edge(n1, n2, weight)
                    .map_err(MatchError::EdgeRejected)
            });
            match outcome {
                Ok(()) => report.edges_created += 1,
                Err(reason) => {
                    tracing::warn!(
                        "Skipping edge on line {}: {} {} {} ({})",
                        line,
                        a,
                        b,
                        weight,
                        reason
                    );
                    report.skipped.push(SkippedEdge {
                        line,
                        n1: a,
                        n2: b,
                        weight,
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            "Imported {} nodes and {} edges ({} skipped)",
            report.nodes_created,
            report.edges_created,
            report.skipped.len()
        );
        report
    }

    /// Map a node line ordinal to the unique graph node at that record's position.
    fn resolve(&self, store: &GraphStore, created: &[Node], index: usize) -> Result<NodeId, MatchError> {
        let record = created
            .get(index)
            .ok_or(MatchError::NodeMatchFailed { index })?;

        let candidates: Vec<NodeId> = store
            .nodes()
            .filter(|node| node.position.approx_eq(&record.position, self.options.tolerance))
            .map(|node| node.id)
            .collect();

        match candidates.as_slice() {
            [] => Err(MatchError::NodeMatchFailed { index }),
            [id] => Ok(*id),
            _ => Err(MatchError::AmbiguousNodeMatch { index, candidates }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GraphError;
    use crate::core::types::EdgeRecord;
    use crate::storage::serializer;

    fn import(text: &str) -> (GraphStore, ImportReport) {
        let mut store = GraphStore::new();
        let report = Importer::default().import_text(&mut store, text);
        (store, report)
    }

    #[test]
    fn round_trips_exported_graph() {
        let mut source = GraphStore::new();
        source.add_node(0.0, 0.0);
        source.add_node(1.0, 1.0);
        source.add_node(2.0, 2.0);
        source.add_edge(0, 1, 5.0).unwrap();
        source.add_edge(1, 2, 3.0).unwrap();

        let (store, report) = import(&serializer::export(&source));
        assert!(report.is_complete());
        assert_eq!(report.nodes_created, 3);
        assert_eq!(report.edges_created, 2);
        assert_eq!(store.snapshot(), source.snapshot());
    }

    #[test]
    fn replaces_previous_contents_and_restarts_ids() {
        let mut store = GraphStore::new();
        for i in 0..5 {
            store.add_node(i as f64, 0.0);
        }
        let report = Importer::default().import_text(&mut store, "7.0 8.0\n");
        assert_eq!(report.nodes_created, 1);
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.position(0), Some(Position::new(7.0, 8.0)));
        assert_eq!(store.add_node(9.0, 9.0), 1);
    }

    #[test]
    fn out_of_range_index_skips_only_that_edge() {
        let (store, report) = import("0 0\n1 1\n2 2\n0 1 5.0\n1 9 3.0\n1 2 4.0\n");
        assert_eq!(report.edges_created, 2);
        assert_eq!(
            report.skipped,
            vec![SkippedEdge {
                line: 5,
                n1: 1,
                n2: 9,
                weight: 3.0,
                reason: MatchError::NodeMatchFailed { index: 9 },
            }]
        );
        assert_eq!(store.edge_weight(0, 1), Ok(5.0));
        assert_eq!(store.edge_weight(2, 1), Ok(4.0));
    }

    #[test]
    fn duplicate_coordinates_are_ambiguous() {
        let (store, report) = import("5.0 5.0\n5.0000001 5.0\n6.0 6.0\n0 2 1.0\n");
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(
            report.skipped[0].reason,
            MatchError::AmbiguousNodeMatch {
                index: 0,
                candidates: vec![0, 1],
            }
        );
    }

    #[test]
    fn tolerance_is_configurable() {
        let mut store = GraphStore::new();
        let importer = Importer::new(ImportOptions {
            tolerance: 1e-9,
            ..ImportOptions::default()
        })
        .unwrap();
        let report = importer.import_text(&mut store, "5.0 5.0\n5.0000001 5.0\n0 1 1.0\n");
        assert!(report.is_complete());
        assert_eq!(store.edge_weight(0, 1), Ok(1.0));
    }

    #[test]
    fn edges_use_allocated_ids_regardless_of_line_position() {
        // Edge lines come first and node lines are interleaved with junk
        let text = "1 0 2.5\n# waypoints\n10.0 20.0\n\n11.0 21.0\n";
        let (store, report) = import(text);
        assert!(report.is_complete());
        assert_eq!(store.snapshot().edges, vec![EdgeRecord::new(1, 0, 2.5)]);
    }

    #[test]
    fn repeated_and_looping_edges_are_skipped() {
        let (store, report) = import("0 0\n1 1\n0 1 1.0\n1 0 2.0\n1 1 3.0\n");
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.edge_weight(0, 1), Ok(1.0));
        let reasons: Vec<_> = report.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                MatchError::EdgeRejected(GraphError::EdgeAlreadyExists { n1: 1, n2: 0 }),
                MatchError::EdgeRejected(GraphError::SelfLoop { id: 1 }),
            ]
        );
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let (store, report) = import("1.0 abc\n2.0 3.0\n0 x 1.0\n-1 0 1.0\n0 0 heavy\n1 2 3 4\n");
        assert_eq!(store.node_count(), 1);
        assert_eq!(report.edges_created, 0);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn bad_weights_are_reported_as_skipped() {
        let (store, report) = import("0 0\n1 1\n2 2\n0 1 NaN\n1 2 inf\n0 2 -4.0\n");
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(report.skipped.len(), 3);
        assert!(report
            .skipped
            .iter()
            .all(|s| matches!(s.reason, MatchError::EdgeRejected(GraphError::InvalidWeight { .. }))));
        assert_eq!(report.skipped[1].line, 5);
    }

    #[test]
    fn rejects_unusable_tolerance() {
        for tolerance in [0.0, -1e-6, f64::NAN, f64::INFINITY] {
            let options = ImportOptions {
                tolerance,
                ..ImportOptions::default()
            };
            assert!(matches!(Importer::new(options), Err(Error::Config(_))));
        }
        let options = ImportOptions {
            max_bytes: 0,
            ..ImportOptions::default()
        };
        assert!(Importer::new(options).is_err());
    }

    #[test]
    fn oversized_input_leaves_store_untouched() {
        let mut store = GraphStore::new();
        store.add_node(1.0, 1.0);
        let importer = Importer::new(ImportOptions {
            max_bytes: 4,
            ..ImportOptions::default()
        })
        .unwrap();
        assert_eq!(
            importer.import(&mut store, b"0.0 0.0\n"),
            Err(ImportError::InputTooLarge { size: 8, max: 4 })
        );
        assert_eq!(
            importer.import(&mut store, &[0xff, 0xfe]),
            Err(ImportError::InvalidUtf8)
        );
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn skipped_reason_serializes_as_text() {
        let skipped = SkippedEdge {
            line: 3,
            n1: 0,
            n2: 4,
            weight: 1.0,
            reason: MatchError::NodeMatchFailed { index: 4 },
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["reason"], "No node matches record index 4");
    }
}
