use std::collections::{HashMap, HashSet};

use crate::errors::{Result, StoryMapError};
use crate::ops::store::container_label;
use crate::ops::Store;

/// Check if a story's parent chain loops back on itself
pub fn has_cycle(store: &Store, story_id: &str) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(story_id);

    while let Some(id) = current {
        if !visited.insert(id) {
            return true;
        }
        match store.get_story(id) {
            Ok(story) => current = story.parent_id.as_deref(),
            Err(_) => break,
        }
    }

    false
}

/// Would re-parenting `story_id` under `new_parent_id` make the story its
/// own ancestor?
///
/// Walks from the new parent up to its root. A pre-existing loop in that
/// chain is reported as a cycle as well.
///
/// # Errors
///
/// Returns `OrphanedStory` if the chain runs into a missing parent.
pub fn would_create_cycle(store: &Store, story_id: &str, new_parent_id: &str) -> Result<bool> {
    let mut visited = HashSet::new();
    let mut current = Some(new_parent_id.to_string());

    while let Some(id) = current {
        if id == story_id || !visited.insert(id.clone()) {
            return Ok(true);
        }
        let story = store.get_story(&id).map_err(|_| StoryMapError::OrphanedStory {
            story_id: story_id.to_string(),
            parent_id: id.clone(),
        })?;
        current = story.parent_id.clone();
    }

    Ok(false)
}

/// Stories whose parent_id points at a missing story
///
/// Returns (story_id, parent_id) tuples
pub fn find_orphans(store: &Store) -> Vec<(String, String)> {
    store
        .list_stories()
        .into_iter()
        .filter_map(|story| {
            let parent_id = story.parent_id.as_ref()?;
            (!store.story_exists(parent_id)).then(|| (story.id.clone(), parent_id.clone()))
        })
        .collect()
}

/// Stories that sit on a cyclic parent chain, sorted by id
pub fn find_cycles(store: &Store) -> Vec<String> {
    store
        .list_stories()
        .into_iter()
        .filter(|story| has_cycle(store, &story.id))
        .map(|story| story.id.clone())
        .collect()
}

/// Stories whose mr_id differs from their parent's mr_id
///
/// Returns (story_id, story_mr_id, parent_id, parent_mr_id) tuples
pub fn find_cross_merge_request_links(store: &Store) -> Vec<(String, String, String, String)> {
    let mut found = Vec::new();
    for story in store.list_stories() {
        let Some(parent_id) = story.parent_id.as_ref() else {
            continue;
        };
        let Ok(parent) = store.get_story(parent_id) else {
            continue;
        };
        if parent.mr_id != story.mr_id {
            found.push((
                story.id.clone(),
                story.mr_id.clone(),
                parent.id.clone(),
                parent.mr_id.clone(),
            ));
        }
    }
    found
}

/// Stories whose mr_id names an unregistered merge request
///
/// Returns (story_id, mr_id) tuples
pub fn find_unknown_merge_requests(store: &Store) -> Vec<(String, String)> {
    store
        .list_stories()
        .into_iter()
        .filter(|story| store.get_merge_request(&story.mr_id).is_err())
        .map(|story| (story.id.clone(), story.mr_id.clone()))
        .collect()
}

/// Sibling lists (MR root lists and child lists) whose `order` values are
/// not exactly their list positions
///
/// Returns (container, story_id, expected, actual) tuples
pub fn find_order_gaps(store: &Store) -> Vec<(String, String, u32, u32)> {
    let mut lists: Vec<(String, &Vec<String>)> = Vec::new();
    for mr in store.list_merge_requests() {
        lists.push((container_label(&mr.id, None), &mr.story_ids));
    }
    for story in store.list_stories() {
        lists.push((container_label(&story.mr_id, Some(&story.id)), &story.child_ids));
    }

    let mut gaps = Vec::new();
    for (container, ids) in lists {
        for (index, id) in ids.iter().enumerate() {
            let Ok(story) = store.get_story(id) else {
                continue;
            };
            let expected = index as u32;
            if story.order != expected {
                gaps.push((container.clone(), id.clone(), expected, story.order));
            }
        }
    }
    gaps
}

/// Stories whose depth is not parent depth + 1 (or 0 for roots)
///
/// Returns (story_id, expected, actual) tuples. Stories with a missing
/// parent are left to `find_orphans`.
pub fn find_depth_mismatches(store: &Store) -> Vec<(String, u32, u32)> {
    let mut mismatches = Vec::new();
    for story in store.list_stories() {
        let expected = match story.parent_id.as_deref() {
            None => 0,
            Some(pid) => match store.get_story(pid) {
                Ok(parent) => parent.depth + 1,
                Err(_) => continue,
            },
        };
        if story.depth != expected {
            mismatches.push((story.id.clone(), expected, story.depth));
        }
    }
    mismatches
}

/// Disagreements between the two directions of every link
///
/// Checks that each story appears exactly once, in the sibling list its
/// placement names, and that each test is listed by exactly the story it
/// points at. Returns (entity_id, container, reason) tuples.
pub fn find_membership_inconsistencies(store: &Store) -> Vec<(String, String, String)> {
    let mut issues = Vec::new();
    let mut listed_in: HashMap<&str, Vec<String>> = HashMap::new();

    for mr in store.list_merge_requests() {
        let container = container_label(&mr.id, None);
        for id in &mr.story_ids {
            match store.get_story(id) {
                Ok(story) if story.parent_id.is_some() || story.mr_id != mr.id => issues.push((
                    id.clone(),
                    container.clone(),
                    "listed as root but placed elsewhere".to_string(),
                )),
                Ok(_) => {}
                Err(_) => issues.push((
                    id.clone(),
                    container.clone(),
                    "lists unknown story".to_string(),
                )),
            }
            listed_in.entry(id.as_str()).or_default().push(container.clone());
        }
    }

    for story in store.list_stories() {
        let container = container_label(&story.mr_id, Some(&story.id));
        for child_id in &story.child_ids {
            match store.get_story(child_id) {
                Ok(child) if child.parent_id.as_deref() != Some(story.id.as_str()) => {
                    issues.push((
                        child_id.clone(),
                        container.clone(),
                        "listed as child but parent_id differs".to_string(),
                    ))
                }
                Ok(_) => {}
                Err(_) => issues.push((
                    child_id.clone(),
                    container.clone(),
                    "lists unknown story".to_string(),
                )),
            }
            listed_in
                .entry(child_id.as_str())
                .or_default()
                .push(container.clone());
        }

        for test_id in &story.test_ids {
            match store.get_test(test_id) {
                Ok(test) if test.story_id != story.id => issues.push((
                    test_id.clone(),
                    container.clone(),
                    format!("test belongs to story {}", test.story_id),
                )),
                Ok(_) => {}
                Err(_) => issues.push((
                    test_id.clone(),
                    container.clone(),
                    "lists unknown test".to_string(),
                )),
            }
        }
    }

    for story in store.list_stories() {
        let expected = container_label(&story.mr_id, story.parent_id.as_deref());
        let containers = listed_in.get(story.id.as_str()).cloned().unwrap_or_default();
        if containers.len() != 1 || containers[0] != expected {
            issues.push((
                story.id.clone(),
                expected,
                format!("listed in {} sibling lists", containers.len()),
            ));
        }
    }

    for test in store.list_tests() {
        let listed = store
            .get_story(&test.story_id)
            .map(|story| story.test_ids.iter().filter(|id| **id == test.id).count())
            .unwrap_or(0);
        if listed != 1 {
            issues.push((
                test.id.clone(),
                container_label("", Some(&test.story_id)),
                format!("listed {} times by its story", listed),
            ));
        }
    }

    issues
}
