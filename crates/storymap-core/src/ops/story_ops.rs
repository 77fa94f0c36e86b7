use chrono::Utc;
use serde::{Deserialize, Serialize};
use storymap_core_types::Sensitive;
use uuid::Uuid;

use super::store::Store;
use crate::errors::{Result, StoryMapError};
use crate::model::{Assignee, Story, WorkflowStatus};
use crate::rules::fields::{clamp_story_points, validate_assignee, validate_estimate, validate_title};

/// Creation payload for a story
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryInput {
    /// Host-supplied id; a UUID v7 is generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub mr_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub as_a: String,
    #[serde(default)]
    pub i_want: String,
    #[serde(default)]
    pub so_that: String,
    #[serde(default)]
    pub estimate_days: Option<f64>,
    /// Clamped into 0..=100
    #[serde(default)]
    pub story_points: Option<i64>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub status: WorkflowStatus,
}

/// Partial update of a story's own fields
///
/// Placement (parent, order, depth) is changed only through `move_story`.
/// The double options distinguish "leave alone" from "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryPatch {
    pub title: Option<String>,
    pub as_a: Option<String>,
    pub i_want: Option<String>,
    pub so_that: Option<String>,
    pub status: Option<WorkflowStatus>,
    pub estimate_days: Option<Option<f64>>,
    pub story_points: Option<Option<i64>>,
    pub assignee: Option<Option<Assignee>>,
}

impl StoryPatch {
    pub fn is_empty(&self) -> bool {
        *self == StoryPatch::default()
    }
}

/// Everything removed by a cascading delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedSubtree {
    /// Removed stories, pre-order from the deleted root
    pub story_ids: Vec<String>,
    pub test_ids: Vec<String>,
    /// Former siblings whose order was renumbered
    pub renumbered: Vec<String>,
}

/// Create a story at the end of its sibling list
///
/// The story lands under `parent_id` when given, otherwise as the last root
/// of its merge request. Depth follows the parent; version starts at 0.
///
/// # Errors
/// * `Validation` - empty title, negative/non-finite estimate, bad assignee
/// * `MergeRequestNotFound` - unknown `mr_id`
/// * `ParentNotFound` - unknown `parent_id`
/// * `CrossMergeRequest` - parent belongs to another merge request
/// * `AlreadyExists` - host-supplied id already in use
pub fn create_story(store: &mut Store, input: StoryInput) -> Result<Story> {
    validate_title(&input.title)?;
    validate_estimate(input.estimate_days)?;
    if let Some(assignee) = &input.assignee {
        validate_assignee(assignee)?;
    }

    store.get_merge_request(&input.mr_id)?;

    let id = match input.id {
        Some(id) if id.trim().is_empty() => {
            return Err(StoryMapError::validation("id", "cannot be empty"));
        }
        Some(id) if store.id_in_use(&id) => {
            return Err(StoryMapError::AlreadyExists { entity_id: id });
        }
        Some(id) => id,
        None => Uuid::now_v7().to_string(),
    };

    let depth = match input.parent_id.as_deref() {
        Some(parent_id) => {
            let parent = store
                .get_story(parent_id)
                .map_err(|_| StoryMapError::ParentNotFound {
                    parent_id: parent_id.to_string(),
                })?;
            if parent.mr_id != input.mr_id {
                return Err(StoryMapError::CrossMergeRequest {
                    story_id: id,
                    story_mr_id: input.mr_id,
                    parent_id: parent.id.clone(),
                    parent_mr_id: parent.mr_id.clone(),
                });
            }
            parent.depth + 1
        }
        None => 0,
    };

    let mut story = Story::new(id.clone(), input.mr_id.clone(), input.title.trim().to_string());
    story.parent_id = input.parent_id.clone();
    story.depth = depth;
    story.as_a = input.as_a;
    story.i_want = input.i_want;
    story.so_that = input.so_that;
    story.estimate_days = input.estimate_days;
    story.story_points = input.story_points.map(clamp_story_points);
    story.assignee = input.assignee;
    story.status = input.status;

    let siblings = store.sibling_ids_mut(&input.mr_id, input.parent_id.as_deref())?;
    story.order = siblings.len() as u32;
    siblings.push(id.clone());

    if let Some(assignee) = &story.assignee {
        tracing::debug!(
            story_id = %id,
            assignee_email = %Sensitive::new(assignee.email.as_str()),
            "story assigned"
        );
    }
    tracing::debug!(story_id = %id, depth, order = story.order, "story created");

    store.insert_story(story.clone());
    Ok(story)
}

/// Update narrative, title, status, estimate, points or assignee
///
/// All fields are validated before any is written. Bumps the version.
///
/// # Errors
/// * `StoryNotFound` - unknown story
/// * `Validation` - as for `create_story`
pub fn update_story_fields(store: &mut Store, story_id: &str, patch: StoryPatch) -> Result<Story> {
    store.get_story(story_id)?;

    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(estimate) = patch.estimate_days {
        validate_estimate(estimate)?;
    }
    if let Some(Some(assignee)) = &patch.assignee {
        validate_assignee(assignee)?;
    }

    let story = store.get_story_mut(story_id)?;
    if let Some(title) = patch.title {
        story.title = title.trim().to_string();
    }
    if let Some(as_a) = patch.as_a {
        story.as_a = as_a;
    }
    if let Some(i_want) = patch.i_want {
        story.i_want = i_want;
    }
    if let Some(so_that) = patch.so_that {
        story.so_that = so_that;
    }
    if let Some(status) = patch.status {
        story.status = status;
    }
    if let Some(estimate) = patch.estimate_days {
        story.estimate_days = estimate;
    }
    if let Some(points) = patch.story_points {
        story.story_points = points.map(clamp_story_points);
    }
    if let Some(assignee) = patch.assignee {
        story.assignee = assignee;
    }
    story.touch();

    Ok(story.clone())
}

/// Delete a story, its whole subtree and every owned acceptance test
///
/// Former siblings are renumbered and their versions bumped.
///
/// # Errors
/// * `StoryNotFound` - unknown story
pub fn delete_story(store: &mut Store, story_id: &str) -> Result<DeletedSubtree> {
    let root = store.get_story(story_id)?;
    let mr_id = root.mr_id.clone();
    let parent_id = root.parent_id.clone();

    let story_ids = collect_subtree(store, story_id)?;
    let mut test_ids = Vec::new();
    for id in &story_ids {
        test_ids.extend(store.get_story(id)?.test_ids.iter().cloned());
    }

    store
        .sibling_ids_mut(&mr_id, parent_id.as_deref())?
        .retain(|id| id != story_id);

    for id in &test_ids {
        store.tests.remove(id);
    }
    for id in &story_ids {
        store.stories.remove(id);
    }

    let renumbered = store.renumber_siblings(&mr_id, parent_id.as_deref())?;
    for id in &renumbered {
        store.get_story_mut(id)?.touch();
    }
    store.get_merge_request_mut(&mr_id)?.updated_at = Utc::now();

    tracing::debug!(
        story_id,
        stories_removed = story_ids.len(),
        tests_removed = test_ids.len(),
        "story subtree deleted"
    );

    Ok(DeletedSubtree {
        story_ids,
        test_ids,
        renumbered,
    })
}

/// Ids of a story and all its descendants, pre-order in sibling order
///
/// # Errors
/// * `StoryNotFound` - the root or a listed child is missing
pub fn collect_subtree(store: &Store, story_id: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut stack = vec![story_id.to_string()];
    while let Some(id) = stack.pop() {
        let story = store.get_story(&id)?;
        stack.extend(story.child_ids.iter().rev().cloned());
        ids.push(id);
    }
    Ok(ids)
}

/// Titles from the merge request's root down to the story, inclusive
///
/// # Errors
/// * `StoryNotFound` / `OrphanedStory` - broken parent chain
pub fn story_path(store: &Store, story_id: &str) -> Result<Vec<String>> {
    let mut path = Vec::new();
    let mut current = Some(story_id.to_string());
    let limit = store.story_count();

    while let Some(id) = current {
        if path.len() > limit {
            return Err(StoryMapError::CycleDetected {
                story_id: story_id.to_string(),
                new_parent_id: id,
            });
        }
        let story = store.get_story(&id).map_err(|err| {
            if path.is_empty() {
                err
            } else {
                StoryMapError::OrphanedStory {
                    story_id: story_id.to_string(),
                    parent_id: id.clone(),
                }
            }
        })?;
        path.push(story.title.clone());
        current = story.parent_id.clone();
    }

    path.reverse();
    Ok(path)
}
