use std::collections::{BTreeSet, HashMap};

use chrono::Utc;

use super::store::Store;
use crate::errors::{Result, StoryMapError};
use crate::rules::invariants::would_create_cycle;

/// What a move changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub story_id: String,
    pub old_parent_id: Option<String>,
    pub new_parent_id: Option<String>,
    /// Final position among the new siblings, after clamping
    pub new_order: u32,
    /// Stories whose parent, order or depth changed, sorted by id
    pub touched: Vec<String>,
}

/// Move a story (with its subtree) under a new parent at `new_index`
///
/// `None` as the new parent makes the story a root of its merge request.
/// `new_index` is clamped to the sibling count. All checks run before the
/// first write, so a failed move leaves the store untouched.
///
/// # Errors
/// * `StoryNotFound` - unknown story
/// * `ParentNotFound` - unknown new parent
/// * `CycleDetected` - new parent is the story itself or one of its descendants
/// * `CrossMergeRequest` - new parent belongs to another merge request
pub fn move_story(
    store: &mut Store,
    story_id: &str,
    new_parent_id: Option<&str>,
    new_index: usize,
) -> Result<MoveReport> {
    let story = store.get_story(story_id)?;
    let mr_id = story.mr_id.clone();
    let old_parent_id = story.parent_id.clone();

    let new_depth = match new_parent_id {
        Some(parent_id) => {
            let parent = store
                .get_story(parent_id)
                .map_err(|_| StoryMapError::ParentNotFound {
                    parent_id: parent_id.to_string(),
                })?;
            if would_create_cycle(store, story_id, parent_id)? {
                return Err(StoryMapError::CycleDetected {
                    story_id: story_id.to_string(),
                    new_parent_id: parent_id.to_string(),
                });
            }
            if parent.mr_id != mr_id {
                return Err(StoryMapError::CrossMergeRequest {
                    story_id: story_id.to_string(),
                    story_mr_id: mr_id,
                    parent_id: parent.id.clone(),
                    parent_mr_id: parent.mr_id.clone(),
                });
            }
            parent.depth + 1
        }
        None => 0,
    };

    // Snapshot placement of everything that can shift, to diff afterwards.
    let mut before: HashMap<String, (Option<String>, u32, u32)> = HashMap::new();
    let mut watched: Vec<String> = super::story_ops::collect_subtree(store, story_id)?;
    watched.extend(store.sibling_ids(&mr_id, old_parent_id.as_deref())?.iter().cloned());
    watched.extend(store.sibling_ids(&mr_id, new_parent_id)?.iter().cloned());
    for id in &watched {
        let s = store.get_story(id)?;
        before.insert(id.clone(), (s.parent_id.clone(), s.order, s.depth));
    }

    store
        .sibling_ids_mut(&mr_id, old_parent_id.as_deref())?
        .retain(|id| id != story_id);
    store.renumber_siblings(&mr_id, old_parent_id.as_deref())?;

    let siblings = store.sibling_ids_mut(&mr_id, new_parent_id)?;
    let index = new_index.min(siblings.len());
    siblings.insert(index, story_id.to_string());
    store.renumber_siblings(&mr_id, new_parent_id)?;

    store.get_story_mut(story_id)?.parent_id = new_parent_id.map(str::to_string);
    recompute_depths(store, story_id, new_depth)?;

    let mut touched = BTreeSet::new();
    for (id, (parent, order, depth)) in &before {
        let s = store.get_story(id)?;
        if s.parent_id != *parent || s.order != *order || s.depth != *depth {
            touched.insert(id.clone());
        }
    }
    for id in &touched {
        store.get_story_mut(id)?.touch();
    }
    store.get_merge_request_mut(&mr_id)?.updated_at = Utc::now();

    tracing::debug!(
        story_id,
        old_parent_id = ?old_parent_id,
        new_parent_id = ?new_parent_id,
        index,
        touched = touched.len(),
        "story moved"
    );

    Ok(MoveReport {
        story_id: story_id.to_string(),
        old_parent_id,
        new_parent_id: new_parent_id.map(str::to_string),
        new_order: index as u32,
        touched: touched.into_iter().collect(),
    })
}

/// Reorder a parent's children (or an MR's roots when `parent_id` is None)
/// to the given id sequence.
///
/// # Errors
/// * `StoryNotFound` / `MergeRequestNotFound` - unknown container
/// * `Validation` - `ordered_ids` is not a permutation of the current children
pub fn reorder_children(
    store: &mut Store,
    mr_id: &str,
    parent_id: Option<&str>,
    ordered_ids: Vec<String>,
) -> Result<Vec<String>> {
    let current = store.sibling_ids(mr_id, parent_id)?;
    let mut expected: Vec<&String> = current.iter().collect();
    let mut proposed: Vec<&String> = ordered_ids.iter().collect();
    expected.sort();
    proposed.sort();
    if expected != proposed {
        return Err(StoryMapError::validation(
            "ordered_ids",
            "must list exactly the current children",
        ));
    }

    *store.sibling_ids_mut(mr_id, parent_id)? = ordered_ids;
    let changed = store.renumber_siblings(mr_id, parent_id)?;
    for id in &changed {
        store.get_story_mut(id)?.touch();
    }
    Ok(changed)
}

/// Set `depth` for a subtree root and propagate parent depth + 1 downward
fn recompute_depths(store: &mut Store, root_id: &str, root_depth: u32) -> Result<()> {
    let mut queue = vec![(root_id.to_string(), root_depth)];
    while let Some((id, depth)) = queue.pop() {
        let story = store.get_story_mut(&id)?;
        story.depth = depth;
        queue.extend(story.child_ids.iter().map(|child| (child.clone(), depth + 1)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::mr_ops::{register_merge_request, MergeRequestInput};
    use crate::ops::story_ops::{create_story, StoryInput};

    fn setup(stories: &[(&str, Option<&str>)]) -> Store {
        let mut store = Store::new();
        register_merge_request(
            &mut store,
            MergeRequestInput {
                id: Some("mr-1".to_string()),
                title: "MR".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        for (id, parent) in stories {
            create_story(
                &mut store,
                StoryInput {
                    id: Some(id.to_string()),
                    mr_id: "mr-1".to_string(),
                    parent_id: parent.map(str::to_string),
                    title: id.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        }
        store
    }

    #[test]
    fn test_move_under_new_parent_recomputes_subtree_depth() {
        let mut store = setup(&[("a", None), ("b", None), ("c", Some("b"))]);

        let report = move_story(&mut store, "b", Some("a"), 0).unwrap();

        assert_eq!(store.get_story("b").unwrap().depth, 1);
        assert_eq!(store.get_story("c").unwrap().depth, 2);
        assert_eq!(report.touched, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(store.get_merge_request("mr-1").unwrap().story_ids, vec!["a"]);
    }

    #[test]
    fn test_index_is_clamped() {
        let mut store = setup(&[("a", None), ("b", None), ("c", None)]);

        let report = move_story(&mut store, "a", None, 99).unwrap();

        assert_eq!(report.new_order, 2);
        assert_eq!(
            store.get_merge_request("mr-1").unwrap().story_ids,
            vec!["b", "c", "a"]
        );
        assert_eq!(store.get_story("b").unwrap().order, 0);
    }

    #[test]
    fn test_move_onto_itself_is_cycle() {
        let mut store = setup(&[("a", None)]);
        let before = store.clone();

        assert!(matches!(
            move_story(&mut store, "a", Some("a"), 0),
            Err(StoryMapError::CycleDetected { .. })
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_move_to_same_position_touches_nothing() {
        let mut store = setup(&[("a", None), ("b", None)]);

        let report = move_story(&mut store, "b", None, 1).unwrap();

        assert!(report.touched.is_empty());
        assert_eq!(store.get_story("b").unwrap().version, 0);
    }

    #[test]
    fn test_reorder_children_requires_permutation() {
        let mut store = setup(&[("p", None), ("x", Some("p")), ("y", Some("p"))]);

        assert!(reorder_children(&mut store, "mr-1", Some("p"), vec!["x".to_string()]).is_err());

        let changed =
            reorder_children(&mut store, "mr-1", Some("p"), vec!["y".to_string(), "x".to_string()])
                .unwrap();
        assert_eq!(changed.len(), 2);
        assert_eq!(store.get_story("y").unwrap().order, 0);
    }
}
