#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{store_with_mr, well_formed_story};
use storymap_core::errors::StoryMapError;
use storymap_core::logging_facility::test_capture::init_test_capture;
use storymap_core::storymap_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use storymap_core::{apply, build_rollup, ApplyOptions, Command, RollupTarget};
use storymap_core::{log_op_end, log_op_error, log_op_start};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, story_id = "s1");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field("story_id"), Some("s1"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = StoryMapError::CycleDetected {
        story_id: "a".to_string(),
        new_parent_id: "b".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one error event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[0].field("err_code"), Some("ERR_CYCLE_DETECTED"));
}

#[test]
fn test_macros_work_as_match_arm_expressions() {
    // Given: a capture and an outcome to report
    let capture = init_test_capture();
    let op_name = "test_macros_in_match_arms_unique_4";
    let outcome: Result<(), StoryMapError> = Err(StoryMapError::StoryNotFound {
        story_id: "s9".to_string(),
    });

    // When: the outcome is logged from match arms without braces
    match &outcome {
        Ok(()) => log_op_end!(op_name, duration_ms = 1, story_id = "s9"),
        Err(err) => log_op_error!(op_name, err.clone(), duration_ms = 1),
    }
    match outcome.as_ref().err() {
        None => log_op_start!(op_name),
        Some(_) => log_op_end!(op_name, duration_ms = 2),
    }

    // Then: the error arm and the end arm each logged once
    assert_eq!(
        capture.count_events(|e| e.op.as_deref() == Some(op_name)
            && e.event.as_deref() == Some(EVENT_END_ERROR)),
        1
    );
    assert_eq!(
        capture.count_events(|e| e.op.as_deref() == Some(op_name)
            && e.event.as_deref() == Some(EVENT_END)),
        1
    );
}

#[test]
fn test_apply_emits_one_start_end_pair_per_command() {
    // GIVEN a capture and a store
    let capture = init_test_capture();
    let state = store_with_mr("mr-log-1");

    // WHEN one story create is applied under a unique id
    apply(
        state,
        Command::StoryCreate(well_formed_story("mr-log-1", "logged-story-unique")),
        &ApplyOptions::default(),
    )
    .unwrap();

    // THEN exactly one create_story end event names that story
    let ends = capture.count_events(|e| {
        e.op.as_deref() == Some("create_story")
            && e.event.as_deref() == Some(EVENT_END)
            && e.field("entity_id") == Some("logged-story-unique")
    });
    assert_eq!(ends, 1);
    capture.assert_event_exists("evaluate_invest", EVENT_END);
}

#[test]
fn test_failed_apply_emits_end_error() {
    let capture = init_test_capture();

    let _ = apply(
        store_with_mr("mr-log-2"),
        Command::StoryDelete {
            story_id: "missing-story-unique".to_string(),
        },
        &ApplyOptions::default(),
    );

    let errors = capture.count_events(|e| {
        e.op.as_deref() == Some("delete_story")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field("err_code") == Some("ERR_NOT_FOUND")
    });
    assert!(errors >= 1);
}

#[test]
fn test_rollup_is_bracketed() {
    let capture = init_test_capture();
    let store = store_with_mr("mr-log-3");

    build_rollup(&store, &RollupTarget::MergeRequest("mr-log-3".to_string())).unwrap();

    capture.assert_event_exists("build_rollup", EVENT_START);
    capture.assert_event_exists("build_rollup", EVENT_END);
}
