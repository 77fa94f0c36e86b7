mod common;

use common::{add_merge_request, add_story, add_test, store_with_mr};
use storymap_core::errors::StoryMapError;
use storymap_core::rules::{invariants, validate_tree};
use storymap_core::Store;

// r -> (a, b), t1 on a
fn populated() -> Store {
    let mut store = store_with_mr("mr-1");
    add_story(&mut store, "mr-1", "r", None);
    add_story(&mut store, "mr-1", "a", Some("r"));
    add_story(&mut store, "mr-1", "b", Some("r"));
    add_test(&mut store, "a", "t1");
    store
}

// ===== SUCCESS =====

#[test]
fn test_validate_tree_succeeds_on_empty_store() {
    assert!(validate_tree(&Store::new()).is_ok());
}

#[test]
fn test_validate_tree_succeeds_on_populated_store() {
    assert!(validate_tree(&populated()).is_ok());
}

// ===== DETECTION =====

#[test]
fn test_unregistered_merge_request_is_detected() {
    let mut store = populated();
    store.get_story_mut("r").unwrap().mr_id = "ghost".to_string();

    match validate_tree(&store) {
        Err(StoryMapError::MembershipInconsistent { entity_id, container, .. }) => {
            assert_eq!(entity_id, "r");
            assert_eq!(container, "merge_request:ghost");
        }
        other => panic!("expected MembershipInconsistent, got {:?}", other),
    }
}

#[test]
fn test_orphan_is_detected() {
    let mut store = populated();
    store.get_story_mut("b").unwrap().parent_id = Some("ghost".to_string());

    assert!(matches!(
        validate_tree(&store),
        Err(StoryMapError::OrphanedStory { story_id, parent_id })
            if story_id == "b" && parent_id == "ghost"
    ));
}

#[test]
fn test_parent_cycle_is_detected() {
    let mut store = populated();
    store.get_story_mut("a").unwrap().parent_id = Some("b".to_string());
    store.get_story_mut("b").unwrap().parent_id = Some("a".to_string());

    assert!(matches!(
        validate_tree(&store),
        Err(StoryMapError::CycleDetected { .. })
    ));
    let cyclic = invariants::find_cycles(&store);
    assert!(cyclic.contains(&"a".to_string()));
    assert!(cyclic.contains(&"b".to_string()));
}

#[test]
fn test_cross_merge_request_link_is_detected() {
    let mut store = populated();
    add_merge_request(&mut store, "mr-2");
    store.get_story_mut("b").unwrap().mr_id = "mr-2".to_string();

    assert!(matches!(
        validate_tree(&store),
        Err(StoryMapError::CrossMergeRequest { story_id, parent_mr_id, .. })
            if story_id == "b" && parent_mr_id == "mr-1"
    ));
}

#[test]
fn test_one_sided_test_link_is_detected() {
    let mut store = populated();
    store.get_story_mut("a").unwrap().test_ids.clear();

    assert!(matches!(
        validate_tree(&store),
        Err(StoryMapError::MembershipInconsistent { entity_id, .. }) if entity_id == "t1"
    ));
}

#[test]
fn test_order_gap_is_detected() {
    let mut store = populated();
    store.get_story_mut("b").unwrap().order = 4;

    match validate_tree(&store) {
        Err(StoryMapError::OrderNotContiguous { story_id, expected, actual, .. }) => {
            assert_eq!(story_id, "b");
            assert_eq!(expected, 1);
            assert_eq!(actual, 4);
        }
        other => panic!("expected OrderNotContiguous, got {:?}", other),
    }
}

#[test]
fn test_depth_mismatch_is_detected() {
    let mut store = populated();
    store.get_story_mut("a").unwrap().depth = 3;

    assert!(matches!(
        validate_tree(&store),
        Err(StoryMapError::DepthMismatch { story_id, expected: 1, actual: 3 }) if story_id == "a"
    ));
}
