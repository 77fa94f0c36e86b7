//! Snapshot parser with validation
//!
//! Parses YAML and checks schema version, id uniqueness and referential
//! integrity. Structural checks that need the tree (cycles, depth) run in
//! the importer.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::errors::{io_error, snapshot_reference, snapshot_validation, Result};
use crate::snapshot::format_v0::SnapshotV0;

/// Parse a snapshot file from a path
///
/// # Errors
/// * `Io` - the file cannot be read
/// * `Validation` - see [`parse_snapshot_str`]
pub fn parse_snapshot_file(path: &Path) -> Result<SnapshotV0> {
    let content = fs::read_to_string(path).map_err(|e| io_error("snapshot_read", e))?;
    parse_snapshot_str(&content)
}

/// Parse a snapshot from a string
///
/// # Errors
/// * `Validation` - malformed YAML, unsupported version, duplicate ids or
///   dangling references
pub fn parse_snapshot_str(content: &str) -> Result<SnapshotV0> {
    let snapshot: SnapshotV0 = serde_yaml::from_str(content)
        .map_err(|e| snapshot_validation(&format!("YAML parse error: {}", e)))?;

    validate_snapshot(&snapshot)?;

    Ok(snapshot)
}

/// Validate a parsed snapshot
pub(crate) fn validate_snapshot(snapshot: &SnapshotV0) -> Result<()> {
    if snapshot.schema_version != 0 {
        return Err(snapshot_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            snapshot.schema_version
        )));
    }

    // Ids are unique across all three record kinds
    let mut seen = HashSet::new();
    let all_ids = snapshot
        .merge_requests
        .iter()
        .map(|m| &m.id)
        .chain(snapshot.stories.iter().map(|s| &s.id))
        .chain(snapshot.tests.iter().map(|t| &t.id));
    for id in all_ids {
        if !seen.insert(id) {
            return Err(snapshot_reference(id, &format!("Duplicate id {}", id)));
        }
    }

    let mr_ids: HashSet<&String> = snapshot.merge_requests.iter().map(|m| &m.id).collect();
    let story_mr: HashMap<&String, &String> = snapshot
        .stories
        .iter()
        .map(|s| (&s.id, &s.mr_id))
        .collect();

    for story in &snapshot.stories {
        if !mr_ids.contains(&story.mr_id) {
            return Err(snapshot_reference(
                &story.id,
                &format!(
                    "Story {} references non-existent merge request {}",
                    story.id, story.mr_id
                ),
            ));
        }
        if let Some(parent_id) = &story.parent_id {
            match story_mr.get(parent_id) {
                None => {
                    return Err(snapshot_reference(
                        &story.id,
                        &format!(
                            "Story {} references non-existent parent {}",
                            story.id, parent_id
                        ),
                    ));
                }
                Some(parent_mr) if *parent_mr != &story.mr_id => {
                    return Err(snapshot_reference(
                        &story.id,
                        &format!(
                            "Story {} (merge request {}) has parent {} in merge request {}",
                            story.id, story.mr_id, parent_id, parent_mr
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
    }

    // Sibling orders must not collide; gaps are closed on import
    let mut orders = HashSet::new();
    for story in &snapshot.stories {
        let container = story.parent_id.as_ref().unwrap_or(&story.mr_id);
        if !orders.insert((container, story.order)) {
            return Err(snapshot_reference(
                &story.id,
                &format!("Duplicate order {} under {}", story.order, container),
            ));
        }
    }

    for test in &snapshot.tests {
        if !story_mr.contains_key(&test.story_id) {
            return Err(snapshot_reference(
                &test.id,
                &format!(
                    "Test {} references non-existent story {}",
                    test.id, test.story_id
                ),
            ));
        }
    }

    Ok(())
}
