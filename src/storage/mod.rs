//! Flat file persistence
//!
//! This module handles the line-oriented text format used to export and
//! import the whole graph: node lines (`lat lng`) followed by edge lines
//! (`idx1 idx2 weight`) whose indices are node line ordinals.

pub mod serializer;
pub mod importer;

// Re-export main storage types
pub use serializer::{export, export_to_file};
pub use importer::{ImportOptions, ImportReport, Importer, SkippedEdge};
