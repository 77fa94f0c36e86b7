//! Apply Atomicity Tests
//!
//! ## Scenarios Covered
//!
//! 1. Apply returns the new state and refresh hints on success
//! 2. A failing command leaves the caller's retained copy untouched
//! 3. The block policy rejects weak stories as data-bearing errors
//! 4. Test commands re-score the owning story

mod common;

use common::{store_with_mr, well_formed_story};
use storymap_core::invest::{InvestClassification, InvestPolicy};
use storymap_core::ops::{StoryPatch, TestInput};
use storymap_core::{
    apply, ApplyOptions, Command, ExError, ExErrorKind, InvestOptions, StoryMapError, TestStatus,
};

fn block_options() -> ApplyOptions {
    ApplyOptions {
        invest: InvestOptions {
            policy: InvestPolicy::Block,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_apply_returns_new_state_on_success() {
    // GIVEN a store with one merge request
    let state = store_with_mr("mr-1");

    // WHEN a story is created through apply
    let applied = apply(
        state,
        Command::StoryCreate(well_formed_story("mr-1", "export")),
        &ApplyOptions::default(),
    )
    .unwrap();

    // THEN the new state holds it and the refresh hints point at it
    assert_eq!(applied.store.story_count(), 1);
    assert_eq!(applied.entity_id.as_deref(), Some("export"));
    assert_eq!(applied.affected_roots, vec!["export"]);
    assert_eq!(
        applied.invest.map(|a| a.classification),
        Some(InvestClassification::Warn)
    );
}

#[test]
fn test_apply_fails_without_partial_mutation() {
    // GIVEN a store with a story, and a retained copy
    let state = apply(
        store_with_mr("mr-1"),
        Command::StoryCreate(well_formed_story("mr-1", "export")),
        &ApplyOptions::default(),
    )
    .unwrap()
    .store;
    let original = state.clone();

    // WHEN an update with an empty title is applied
    let result = apply(
        state,
        Command::StoryUpdate {
            story_id: "export".to_string(),
            patch: StoryPatch {
                title: Some("   ".to_string()),
                estimate_days: Some(Some(3.0)),
                ..Default::default()
            },
        },
        &ApplyOptions::default(),
    );

    // THEN it fails and the retained copy is unchanged
    assert!(matches!(result, Err(StoryMapError::Validation { .. })));
    let story = original.get_story("export").unwrap();
    assert_eq!(story.title, "export");
    assert_eq!(story.estimate_days, Some(1.5));
    assert_eq!(story.version, 0);
}

#[test]
fn test_block_policy_rejects_story_and_maps_to_policy_denied() {
    // GIVEN the block policy and a story without acceptance tests
    let state = store_with_mr("mr-1");
    let original = state.clone();

    // WHEN it is created
    let err = apply(
        state,
        Command::StoryCreate(well_formed_story("mr-1", "export")),
        &block_options(),
    )
    .unwrap_err();

    // THEN the write is rejected with the failed criteria attached
    assert_eq!(
        err,
        StoryMapError::InvestRejected {
            story_id: "export".to_string(),
            failed: vec!["testable".to_string()],
        }
    );
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::PolicyDenied);
    assert_eq!(ex.http_status_hint(), 422);
    assert_eq!(original.story_count(), 0);
}

#[test]
fn test_block_policy_allows_non_story_writes() {
    // GIVEN a warn-policy store holding a weak story
    let state = apply(
        store_with_mr("mr-1"),
        Command::StoryCreate(well_formed_story("mr-1", "export")),
        &ApplyOptions::default(),
    )
    .unwrap()
    .store;

    // WHEN a complete test is attached under the block policy
    let applied = apply(
        state,
        Command::TestCreate(TestInput {
            id: Some("t1".to_string()),
            story_id: "export".to_string(),
            title: "CSV download".to_string(),
            given: "a closed month".to_string(),
            when: "I click export".to_string(),
            then: "a CSV downloads within 5 seconds".to_string(),
            ..Default::default()
        }),
        &block_options(),
    )
    .unwrap();

    // THEN the owning story now passes
    let analysis = applied.invest.unwrap();
    assert_eq!(applied.entity_id.as_deref(), Some("t1"));
    assert_eq!(analysis.story_id, "export");
    assert_eq!(analysis.classification, InvestClassification::Pass);

    // AND a status change keeps it passing
    let applied = apply(
        applied.store,
        Command::TestSetStatus {
            test_id: "t1".to_string(),
            status: TestStatus::Passed,
        },
        &block_options(),
    )
    .unwrap();
    assert_eq!(
        applied.store.get_test("t1").unwrap().status,
        TestStatus::Passed
    );
}

#[test]
fn test_move_reports_both_affected_roots() {
    let options = ApplyOptions::default();
    let mut state = store_with_mr("mr-1");
    for (id, parent) in [("r1", None), ("r2", None), ("leaf", Some("r1"))] {
        state = apply(
            state,
            Command::StoryCreate(common::story_input("mr-1", id, parent)),
            &options,
        )
        .unwrap()
        .store;
    }

    let applied = apply(
        state,
        Command::StoryMove {
            story_id: "leaf".to_string(),
            new_parent_id: Some("r2".to_string()),
            new_index: 10,
        },
        &options,
    )
    .unwrap();

    let mut roots = applied.affected_roots.clone();
    roots.sort();
    assert_eq!(roots, vec!["r1", "r2"]);
    assert_eq!(applied.store.get_story("leaf").unwrap().order, 0);
}

#[test]
fn test_errors_never_panic_on_unknown_ids() {
    let options = ApplyOptions::default();
    let commands = vec![
        Command::StoryDelete {
            story_id: "ghost".to_string(),
        },
        Command::TestDelete {
            test_id: "ghost".to_string(),
        },
        Command::MergeRequestSetStatus {
            mr_id: "ghost".to_string(),
            status: storymap_core::WorkflowStatus::Done,
        },
        Command::StoryReorderChildren {
            mr_id: "mr-1".to_string(),
            parent_id: Some("ghost".to_string()),
            ordered_ids: Vec::new(),
        },
    ];

    for cmd in commands {
        let err = apply(store_with_mr("mr-1"), cmd, &options).unwrap_err();
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::NotFound);
    }
}
