//! Snapshot export
//!
//! Output is deterministic: merge requests sorted by id, stories in
//! pre-order (roots by order, then children by order), tests following
//! their story's test order.

use std::fs;
use std::path::Path;
use std::time::Instant;

use storymap_core::{log_op_end, log_op_start, Store, Story};

use crate::errors::{io_error, serialization_error, Result};
use crate::snapshot::format_v0::{SnapshotMergeRequest, SnapshotStory, SnapshotTest, SnapshotV0};

/// Capture the store as a version 0 snapshot
pub fn export_snapshot(store: &Store) -> SnapshotV0 {
    let mut snapshot = SnapshotV0 {
        schema_version: 0,
        merge_requests: Vec::new(),
        stories: Vec::new(),
        tests: Vec::new(),
    };

    for mr in store.list_merge_requests() {
        snapshot.merge_requests.push(SnapshotMergeRequest {
            id: mr.id.clone(),
            title: mr.title.clone(),
            description: mr.description.clone(),
            status: mr.status,
            repository: mr.repository.clone(),
            branch: mr.branch.clone(),
            drift: mr.drift,
            last_sync_at: mr.last_sync_at,
            created_at: Some(mr.created_at),
            updated_at: Some(mr.updated_at),
        });

        let mut stack: Vec<&str> = mr.story_ids.iter().rev().map(String::as_str).collect();
        while let Some(id) = stack.pop() {
            let Ok(story) = store.get_story(id) else {
                continue;
            };
            push_story(&mut snapshot, store, story);
            stack.extend(story.child_ids.iter().rev().map(String::as_str));
        }
    }

    snapshot
}

fn push_story(snapshot: &mut SnapshotV0, store: &Store, story: &Story) {
    snapshot.stories.push(SnapshotStory {
        id: story.id.clone(),
        mr_id: story.mr_id.clone(),
        parent_id: story.parent_id.clone(),
        order: story.order,
        title: story.title.clone(),
        as_a: story.as_a.clone(),
        i_want: story.i_want.clone(),
        so_that: story.so_that.clone(),
        estimate_days: story.estimate_days,
        story_points: story.story_points.map(i64::from),
        assignee: story.assignee.clone(),
        status: story.status,
        version: story.version,
        created_at: Some(story.created_at),
        updated_at: Some(story.updated_at),
    });

    for test in story.test_ids.iter().filter_map(|id| store.get_test(id).ok()) {
        snapshot.tests.push(SnapshotTest {
            id: test.id.clone(),
            story_id: test.story_id.clone(),
            title: test.title.clone(),
            given: test.given.clone(),
            when: test.when.clone(),
            then: test.then.clone(),
            status: test.status,
            version: test.version,
            created_at: Some(test.created_at),
            updated_at: Some(test.updated_at),
        });
    }
}

/// Render a snapshot as YAML
///
/// # Errors
/// * `Serialization` - YAML encoding failed
pub fn to_yaml_string(snapshot: &SnapshotV0) -> Result<String> {
    serde_yaml::to_string(snapshot).map_err(|e| serialization_error("snapshot_export", e))
}

/// Export the store and write it to `path`
///
/// # Errors
/// * `Serialization` - YAML encoding failed
/// * `Io` - the file cannot be written
pub fn save_snapshot(path: &Path, store: &Store) -> Result<()> {
    let start = Instant::now();
    log_op_start!("save_snapshot", path = %path.display());
    let snapshot = export_snapshot(store);
    let yaml = to_yaml_string(&snapshot)?;
    fs::write(path, yaml).map_err(|e| io_error("snapshot_write", e))?;
    log_op_end!(
        "save_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        stories = snapshot.stories.len(),
        tests = snapshot.tests.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storymap_core::ops::{
        create_story, create_test, register_merge_request, MergeRequestInput, StoryInput,
        TestInput,
    };

    fn store() -> Store {
        let mut store = Store::new();
        for mr in ["mr-b", "mr-a"] {
            register_merge_request(
                &mut store,
                MergeRequestInput {
                    id: Some(mr.to_string()),
                    title: mr.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        }
        for (id, mr, parent) in [
            ("r1", "mr-a", None),
            ("r2", "mr-a", None),
            ("c1", "mr-a", Some("r1")),
            ("b1", "mr-b", None),
        ] {
            create_story(
                &mut store,
                StoryInput {
                    id: Some(id.to_string()),
                    mr_id: mr.to_string(),
                    parent_id: parent.map(str::to_string),
                    title: id.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        }
        create_test(
            &mut store,
            TestInput {
                id: Some("t1".to_string()),
                story_id: "c1".to_string(),
                title: "Pays".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        store
    }

    #[test]
    fn test_export_is_sorted_and_pre_order() {
        let snapshot = export_snapshot(&store());

        let mrs: Vec<&str> = snapshot.merge_requests.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(mrs, vec!["mr-a", "mr-b"]);
        let stories: Vec<&str> = snapshot.stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(stories, vec!["r1", "c1", "r2", "b1"]);
        assert_eq!(snapshot.tests[0].story_id, "c1");
    }

    #[test]
    fn test_yaml_output_is_stable() {
        let store = store();
        let first = to_yaml_string(&export_snapshot(&store)).unwrap();
        let second = to_yaml_string(&export_snapshot(&store)).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("schema_version: 0"));
    }
}
