//! Rollup builder laws: additivity, leaf counts, idempotence

mod common;

use common::{add_story, add_test, store_with_mr};
use proptest::prelude::*;
use storymap_core::ops::{update_story_fields, StoryPatch};
use storymap_core::rollup::{affected_roots, RollupCounts};
use storymap_core::{build_rollup, RollupResult, RollupTarget, Store, WorkflowStatus};

fn set_status(store: &mut Store, id: &str, status: WorkflowStatus) {
    update_story_fields(
        store,
        id,
        StoryPatch {
            status: Some(status),
            ..Default::default()
        },
    )
    .unwrap();
}

fn assert_additive(node: &RollupResult) {
    let mut expected = RollupCounts {
        total: 1,
        done: u32::from(node.status == WorkflowStatus::Done),
        blocked: u32::from(node.status == WorkflowStatus::Blocked),
    };
    for child in &node.children {
        assert_additive(child);
        expected.total += child.counts.total;
        expected.done += child.counts.done;
        expected.blocked += child.counts.blocked;
    }
    assert_eq!(node.counts, expected, "counts of {}", node.story_id);
}

#[test]
fn test_merge_request_rollup_lists_roots_in_order() {
    // GIVEN two roots, the first with a tested child
    let mut store = store_with_mr("mr-1");
    add_story(&mut store, "mr-1", "r1", None);
    add_story(&mut store, "mr-1", "r2", None);
    add_story(&mut store, "mr-1", "c", Some("r1"));
    add_test(&mut store, "c", "t1");
    set_status(&mut store, "c", WorkflowStatus::Done);

    // WHEN the merge request is rolled up
    let rollups = build_rollup(&store, &RollupTarget::MergeRequest("mr-1".to_string())).unwrap();

    // THEN roots come back in order with tests attached to their story
    let ids: Vec<&str> = rollups.iter().map(|r| r.story_id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2"]);
    assert_eq!(rollups[0].counts.total, 2);
    assert_eq!(rollups[0].counts.done, 1);
    let child = rollups[0].find("c").unwrap();
    assert_eq!(child.tests.len(), 1);
    assert!(child.tests[0].complete);
}

#[test]
fn test_story_target_and_missing_target() {
    let mut store = store_with_mr("mr-1");
    add_story(&mut store, "mr-1", "r", None);

    let rollups = build_rollup(&store, &RollupTarget::Story("r".to_string())).unwrap();
    assert_eq!(rollups.len(), 1);
    assert_eq!(
        rollups[0].counts,
        RollupCounts {
            total: 1,
            done: 0,
            blocked: 0
        }
    );

    assert!(build_rollup(&store, &RollupTarget::Story("ghost".to_string())).is_err());
    assert!(build_rollup(&store, &RollupTarget::MergeRequest("ghost".to_string())).is_err());
}

#[test]
fn test_affected_roots_after_change() {
    let mut store = store_with_mr("mr-1");
    add_story(&mut store, "mr-1", "r1", None);
    add_story(&mut store, "mr-1", "r2", None);
    add_story(&mut store, "mr-1", "deep", Some("r2"));

    let roots = affected_roots(&store, &["deep".to_string(), "r1".to_string()]).unwrap();
    assert_eq!(roots, vec!["r2", "r1"]);
}

fn status_strategy() -> impl Strategy<Value = WorkflowStatus> {
    prop::sample::select(WorkflowStatus::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_rollup_is_additive_and_idempotent(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 1..25),
        statuses in prop::collection::vec(status_strategy(), 25),
    ) {
        // Story i hangs under an earlier story (or is a root when i == 0)
        let mut store = store_with_mr("mr-1");
        for (i, pick) in parents.iter().enumerate() {
            let id = format!("s{}", i);
            let parent = (i > 0).then(|| format!("s{}", pick.index(i)));
            add_story(&mut store, "mr-1", &id, parent.as_deref());
            set_status(&mut store, &id, statuses[i]);
        }

        let target = RollupTarget::MergeRequest("mr-1".to_string());
        let first = build_rollup(&store, &target).unwrap();
        let second = build_rollup(&store, &target).unwrap();

        prop_assert_eq!(&first, &second);
        let total: u32 = first.iter().map(|r| r.counts.total).sum();
        prop_assert_eq!(total as usize, parents.len());
        for root in &first {
            assert_additive(root);
        }
    }
}
