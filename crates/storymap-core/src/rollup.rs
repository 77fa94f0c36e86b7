//! Bottom-up aggregation of story status over a subtree
//!
//! Counts are additive: a node contributes 1 to `total` and 1 to `done` or
//! `blocked` when its own status says so, and adds its children's counts.
//! There is no "all children done implies done" cascade.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::logging_facility::with_op_logging;
use crate::model::{TestStatus, WorkflowStatus};
use crate::ops::Store;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupCounts {
    pub total: u32,
    pub done: u32,
    pub blocked: u32,
}

impl RollupCounts {
    fn for_status(status: WorkflowStatus) -> Self {
        Self {
            total: 1,
            done: u32::from(status == WorkflowStatus::Done),
            blocked: u32::from(status == WorkflowStatus::Blocked),
        }
    }

    fn add(&mut self, other: &RollupCounts) {
        self.total += other.total;
        self.done += other.done;
        self.blocked += other.blocked;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceTestSummary {
    pub id: String,
    pub title: String,
    pub status: TestStatus,
    pub complete: bool,
}

/// Derived view of one story and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupResult {
    pub story_id: String,
    pub title: String,
    pub status: WorkflowStatus,
    pub depth: u32,
    pub children: Vec<RollupResult>,
    pub tests: Vec<AcceptanceTestSummary>,
    pub counts: RollupCounts,
}

/// What to roll up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollupTarget {
    /// Every root of the merge request, in order
    MergeRequest(String),
    /// One story's subtree
    Story(String),
}

/// Build rollups for a merge request or a single story subtree
///
/// # Errors
/// * `MergeRequestNotFound` / `StoryNotFound` - unknown target or dangling link
pub fn build_rollup(store: &Store, target: &RollupTarget) -> Result<Vec<RollupResult>> {
    with_op_logging("build_rollup", || match target {
        RollupTarget::MergeRequest(mr_id) => store
            .get_merge_request(mr_id)?
            .story_ids
            .iter()
            .map(|id| rollup_story(store, id))
            .collect(),
        RollupTarget::Story(story_id) => Ok(vec![rollup_story(store, story_id)?]),
    })
}

/// Rollup of a single story's subtree
///
/// # Errors
/// * `StoryNotFound` - unknown story or dangling child/test link
pub fn rollup_story(store: &Store, story_id: &str) -> Result<RollupResult> {
    let story = store.get_story(story_id)?;

    let children = story
        .child_ids
        .iter()
        .map(|child_id| rollup_story(store, child_id))
        .collect::<Result<Vec<_>>>()?;

    let tests = store
        .tests_of(story_id)?
        .into_iter()
        .map(|test| AcceptanceTestSummary {
            id: test.id.clone(),
            title: test.title.clone(),
            status: test.status,
            complete: test.is_complete(),
        })
        .collect();

    let mut counts = RollupCounts::for_status(story.status);
    for child in &children {
        counts.add(&child.counts);
    }

    Ok(RollupResult {
        story_id: story.id.clone(),
        title: story.title.clone(),
        status: story.status,
        depth: story.depth,
        children,
        tests,
        counts,
    })
}

/// Root story whose rollup must be rebuilt after a change to `story_id`
///
/// # Errors
/// * `StoryNotFound` - unknown story or broken parent chain
pub fn affected_root(store: &Store, story_id: &str) -> Result<String> {
    let mut current = store.get_story(story_id)?;
    let mut steps = 0;
    while let Some(parent_id) = current.parent_id.as_deref() {
        steps += 1;
        if steps > store.story_count() {
            return Err(crate::errors::StoryMapError::CycleDetected {
                story_id: story_id.to_string(),
                new_parent_id: parent_id.to_string(),
            });
        }
        current = store.get_story(parent_id)?;
    }
    Ok(current.id.clone())
}

/// Distinct roots to rebuild after a change touching several stories,
/// in first-seen order. Ids no longer in the store are skipped.
///
/// # Errors
/// * `StoryNotFound` / `CycleDetected` - broken parent chain
pub fn affected_roots(store: &Store, story_ids: &[String]) -> Result<Vec<String>> {
    let mut roots: Vec<String> = Vec::new();
    for id in story_ids {
        if store.get_story(id).is_err() {
            continue;
        }
        let root = affected_root(store, id)?;
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    Ok(roots)
}

impl RollupResult {
    /// Find a node by story id in this subtree
    pub fn find(&self, story_id: &str) -> Option<&RollupResult> {
        if self.story_id == story_id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(story_id))
    }
}
