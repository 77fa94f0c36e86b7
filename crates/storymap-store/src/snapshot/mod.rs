//! Snapshot import/export
//!
//! Provides:
//! - Snapshot Format v0 schema
//! - YAML parser with validation
//! - Importer that replays records through the core operations
//! - Deterministic exporter
//! - Digest canonicalization

pub mod digest;
pub mod exporter;
pub mod format_v0;
pub mod importer;
pub mod parser;

pub use digest::compute_snapshot_digest;
pub use exporter::{export_snapshot, save_snapshot, to_yaml_string};
pub use format_v0::{SnapshotMergeRequest, SnapshotStory, SnapshotTest, SnapshotV0};
pub use importer::{import_snapshot, load_snapshot};
pub use parser::{parse_snapshot_file, parse_snapshot_str};
