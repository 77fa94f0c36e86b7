//! StoryMap Store - flat YAML snapshots of a story map
//!
//! Provides:
//! - Snapshot Format v0 schema (`merge_requests`, `stories`, `tests`)
//! - YAML parser with referential validation
//! - Importer that rebuilds a `Store` through the core operations
//! - Deterministic exporter and SHA-256 snapshot digest

pub mod errors;
pub mod snapshot;

// Re-export key types
pub use errors::Result;
pub use snapshot::{
    compute_snapshot_digest, export_snapshot, import_snapshot, load_snapshot, parse_snapshot_file,
    parse_snapshot_str, save_snapshot, SnapshotV0,
};
