//! Snapshot digest canonicalization
//!
//! Computes a stable SHA256 digest of a snapshot. Record order in the file
//! does not matter; sibling order does. Sibling `order` values are reduced
//! to their rank, so a snapshot and its re-export hash the same.

use std::collections::HashMap;

use serde::Serialize;
use sha2::{Digest, Sha256};
use storymap_core::model::Assignee;
use storymap_core::{TestStatus, WorkflowStatus};

use crate::errors::{serialization_error, Result};
use crate::snapshot::format_v0::SnapshotV0;

#[derive(Debug, Serialize)]
struct CanonicalSnapshot<'a> {
    schema_version: u32,
    merge_requests: Vec<CanonicalMergeRequest<'a>>,
    stories: Vec<CanonicalStory<'a>>,
    tests: Vec<CanonicalTest<'a>>,
}

#[derive(Debug, Serialize)]
struct CanonicalMergeRequest<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    status: WorkflowStatus,
    repository: &'a str,
    branch: &'a str,
    drift: bool,
    last_sync_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct CanonicalStory<'a> {
    id: &'a str,
    mr_id: &'a str,
    parent_id: Option<&'a str>,
    rank: usize,
    title: &'a str,
    as_a: &'a str,
    i_want: &'a str,
    so_that: &'a str,
    estimate_days: Option<f64>,
    story_points: Option<i64>,
    assignee: Option<&'a Assignee>,
    status: WorkflowStatus,
}

#[derive(Debug, Serialize)]
struct CanonicalTest<'a> {
    id: &'a str,
    story_id: &'a str,
    rank: usize,
    title: &'a str,
    given: &'a str,
    when: &'a str,
    then: &'a str,
    status: TestStatus,
}

/// Compute a stable digest for a snapshot
///
/// Returns the SHA256 hex digest of the canonical JSON form.
///
/// # Errors
/// * `Serialization` - the canonical form cannot be encoded
pub fn compute_snapshot_digest(snapshot: &SnapshotV0) -> Result<String> {
    let canonical = canonicalize(snapshot);
    let json = serde_json::to_string(&canonical)
        .map_err(|e| serialization_error("snapshot_digest", e))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

fn canonicalize(snapshot: &SnapshotV0) -> CanonicalSnapshot<'_> {
    let mut merge_requests: Vec<CanonicalMergeRequest> = snapshot
        .merge_requests
        .iter()
        .map(|m| CanonicalMergeRequest {
            id: &m.id,
            title: &m.title,
            description: &m.description,
            status: m.status,
            repository: &m.repository,
            branch: &m.branch,
            drift: m.drift,
            last_sync_at: m.last_sync_at.map(|at| at.to_rfc3339()),
        })
        .collect();
    merge_requests.sort_by(|a, b| a.id.cmp(b.id));

    // Rank of each story among its siblings
    let mut siblings: HashMap<&str, Vec<(u32, &str)>> = HashMap::new();
    for story in &snapshot.stories {
        let container = story.parent_id.as_deref().unwrap_or(&story.mr_id);
        siblings
            .entry(container)
            .or_default()
            .push((story.order, story.id.as_str()));
    }
    let mut story_rank: HashMap<&str, usize> = HashMap::new();
    for list in siblings.values_mut() {
        list.sort();
        for (rank, (_, id)) in list.iter().enumerate() {
            story_rank.insert(*id, rank);
        }
    }

    let mut stories: Vec<CanonicalStory> = snapshot
        .stories
        .iter()
        .map(|s| CanonicalStory {
            id: &s.id,
            mr_id: &s.mr_id,
            parent_id: s.parent_id.as_deref(),
            rank: story_rank.get(s.id.as_str()).copied().unwrap_or_default(),
            title: &s.title,
            as_a: &s.as_a,
            i_want: &s.i_want,
            so_that: &s.so_that,
            estimate_days: s.estimate_days,
            story_points: s.story_points,
            assignee: s.assignee.as_ref(),
            status: s.status,
        })
        .collect();
    stories.sort_by(|a, b| a.id.cmp(b.id));

    // Tests keep their list position within the owning story
    let mut next_rank: HashMap<&str, usize> = HashMap::new();
    let mut tests: Vec<CanonicalTest> = snapshot
        .tests
        .iter()
        .map(|t| {
            let slot = next_rank.entry(t.story_id.as_str()).or_default();
            let rank = *slot;
            *slot += 1;
            CanonicalTest {
                id: &t.id,
                story_id: &t.story_id,
                rank,
                title: &t.title,
                given: &t.given,
                when: &t.when,
                then: &t.then,
                status: t.status,
            }
        })
        .collect();
    tests.sort_by(|a, b| a.id.cmp(b.id));

    CanonicalSnapshot {
        schema_version: snapshot.schema_version,
        merge_requests,
        stories,
        tests,
    }
}
