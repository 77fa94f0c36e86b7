use crate::errors::{Result, StoryMapError};
use crate::ops::Store;

use super::invariants;

/// Validate every structural invariant of the store
///
/// 1. Every story names a registered merge request
/// 2. Parent chains are acyclic and every parent exists
/// 3. A story's merge request equals its parent's
/// 4. Both directions of every story/test link agree
/// 5. Sibling order is contiguous from 0
/// 6. Depth is parent depth + 1
///
/// # Errors
///
/// Returns the first violation found. Call the `invariants::find_*`
/// functions directly for an exhaustive report.
pub fn validate_tree(store: &Store) -> Result<()> {
    if let Some((story_id, mr_id)) = invariants::find_unknown_merge_requests(store).first() {
        return Err(StoryMapError::MembershipInconsistent {
            entity_id: story_id.clone(),
            container: format!("merge_request:{}", mr_id),
            reason: "merge request is not registered".to_string(),
        });
    }

    if let Some((story_id, parent_id)) = invariants::find_orphans(store).first() {
        return Err(StoryMapError::OrphanedStory {
            story_id: story_id.clone(),
            parent_id: parent_id.clone(),
        });
    }

    if let Some(story_id) = invariants::find_cycles(store).first() {
        let parent_id = store
            .get_story(story_id)?
            .parent_id
            .clone()
            .unwrap_or_default();
        return Err(StoryMapError::CycleDetected {
            story_id: story_id.clone(),
            new_parent_id: parent_id,
        });
    }

    if let Some((story_id, story_mr_id, parent_id, parent_mr_id)) =
        invariants::find_cross_merge_request_links(store).first()
    {
        return Err(StoryMapError::CrossMergeRequest {
            story_id: story_id.clone(),
            story_mr_id: story_mr_id.clone(),
            parent_id: parent_id.clone(),
            parent_mr_id: parent_mr_id.clone(),
        });
    }

    if let Some((entity_id, container, reason)) =
        invariants::find_membership_inconsistencies(store).first()
    {
        return Err(StoryMapError::MembershipInconsistent {
            entity_id: entity_id.clone(),
            container: container.clone(),
            reason: reason.clone(),
        });
    }

    if let Some((container, story_id, expected, actual)) =
        invariants::find_order_gaps(store).first()
    {
        return Err(StoryMapError::OrderNotContiguous {
            container: container.clone(),
            story_id: story_id.clone(),
            expected: *expected,
            actual: *actual,
        });
    }

    if let Some((story_id, expected, actual)) = invariants::find_depth_mismatches(store).first() {
        return Err(StoryMapError::DepthMismatch {
            story_id: story_id.clone(),
            expected: *expected,
            actual: *actual,
        });
    }

    Ok(())
}
