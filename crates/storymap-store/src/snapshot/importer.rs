//! Snapshot importer orchestration
//!
//! Rebuilds a `Store` by replaying the snapshot through the core
//! operations, so every write path validation runs on imported data too.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use storymap_core::ops::{
    create_story, create_test, record_sync, register_merge_request, MergeRequestInput, StoryInput,
    TestInput,
};
use storymap_core::rules::validate_tree;
use storymap_core::{log_op_end, log_op_error, log_op_start, Store};

use crate::errors::{snapshot_reference, Result};
use crate::snapshot::format_v0::{SnapshotStory, SnapshotV0};
use crate::snapshot::parser::{parse_snapshot_file, validate_snapshot};

/// Parse a snapshot file and import it
///
/// # Errors
/// Any parse, validation or import error.
pub fn load_snapshot(path: &Path) -> Result<Store> {
    let snapshot = parse_snapshot_file(path)?;
    import_snapshot(&snapshot)
}

/// Import a snapshot into a fresh store
///
/// 1. Registers merge requests (with status and sync state)
/// 2. Creates stories top-down: roots by order, then each parent's
///    children by order
/// 3. Attaches tests in list order
/// 4. Restores recorded versions and timestamps
/// 5. Runs the full tree validation
///
/// Sibling orders are renumbered to be contiguous.
///
/// # Errors
/// * `Validation` - snapshot fails the parser checks, or stories are not
///   reachable from a root (a parent cycle)
/// * Any error of the core operations (invalid title, estimate, e-mail)
pub fn import_snapshot(snapshot: &SnapshotV0) -> Result<Store> {
    let start = Instant::now();
    log_op_start!(
        "import_snapshot",
        merge_requests = snapshot.merge_requests.len(),
        stories = snapshot.stories.len(),
        tests = snapshot.tests.len()
    );

    let result = build_store(snapshot);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(store) => log_op_end!(
            "import_snapshot",
            duration_ms = duration_ms,
            stories = store.story_count()
        ),
        Err(err) => log_op_error!("import_snapshot", err.clone(), duration_ms = duration_ms),
    }
    result
}

fn build_store(snapshot: &SnapshotV0) -> Result<Store> {
    validate_snapshot(snapshot)?;

    let mut store = Store::new();

    for mr in &snapshot.merge_requests {
        register_merge_request(
            &mut store,
            MergeRequestInput {
                id: Some(mr.id.clone()),
                title: mr.title.clone(),
                description: mr.description.clone(),
                repository: mr.repository.clone(),
                branch: mr.branch.clone(),
                status: mr.status,
            },
        )?;
        match mr.last_sync_at {
            Some(at) => {
                record_sync(&mut store, &mr.id, mr.drift, at)?;
            }
            None => store.get_merge_request_mut(&mr.id)?.drift = mr.drift,
        }
    }

    // Children grouped by parent; roots grouped by merge request
    let mut children: HashMap<&str, Vec<&SnapshotStory>> = HashMap::new();
    let mut roots: HashMap<&str, Vec<&SnapshotStory>> = HashMap::new();
    for story in &snapshot.stories {
        match &story.parent_id {
            Some(parent_id) => children.entry(parent_id.as_str()).or_default().push(story),
            None => roots.entry(story.mr_id.as_str()).or_default().push(story),
        }
    }
    for list in children.values_mut().chain(roots.values_mut()) {
        list.sort_by_key(|s| s.order);
    }

    let mut created: HashSet<&str> = HashSet::new();
    for mr in &snapshot.merge_requests {
        let mut stack: Vec<&SnapshotStory> = roots
            .get(mr.id.as_str())
            .map(|list| list.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(story) = stack.pop() {
            create_story(&mut store, story_input(story))?;
            created.insert(story.id.as_str());
            if let Some(kids) = children.get(story.id.as_str()) {
                stack.extend(kids.iter().rev().copied());
            }
        }
    }

    if let Some(stray) = snapshot
        .stories
        .iter()
        .find(|s| !created.contains(s.id.as_str()))
    {
        return Err(snapshot_reference(
            &stray.id,
            &format!("Story {} is not reachable from any root (parent cycle)", stray.id),
        ));
    }

    for test in &snapshot.tests {
        create_test(
            &mut store,
            TestInput {
                id: Some(test.id.clone()),
                story_id: test.story_id.clone(),
                title: test.title.clone(),
                given: test.given.clone(),
                when: test.when.clone(),
                then: test.then.clone(),
                status: test.status,
            },
        )?;
    }

    restore_history(&mut store, snapshot)?;
    validate_tree(&store)?;
    Ok(store)
}

/// Put back what replay through the core operations reset
fn restore_history(store: &mut Store, snapshot: &SnapshotV0) -> Result<()> {
    for mr in &snapshot.merge_requests {
        let target = store.get_merge_request_mut(&mr.id)?;
        if let Some(at) = mr.created_at {
            target.created_at = at;
        }
        if let Some(at) = mr.updated_at {
            target.updated_at = at;
        }
    }
    for story in &snapshot.stories {
        let target = store.get_story_mut(&story.id)?;
        target.version = story.version;
        if let Some(at) = story.created_at {
            target.created_at = at;
        }
        if let Some(at) = story.updated_at {
            target.updated_at = at;
        }
    }
    for test in &snapshot.tests {
        let target = store.get_test_mut(&test.id)?;
        target.version = test.version;
        if let Some(at) = test.created_at {
            target.created_at = at;
        }
        if let Some(at) = test.updated_at {
            target.updated_at = at;
        }
    }
    Ok(())
}

fn story_input(story: &SnapshotStory) -> StoryInput {
    StoryInput {
        id: Some(story.id.clone()),
        mr_id: story.mr_id.clone(),
        parent_id: story.parent_id.clone(),
        title: story.title.clone(),
        as_a: story.as_a.clone(),
        i_want: story.i_want.clone(),
        so_that: story.so_that.clone(),
        estimate_days: story.estimate_days,
        story_points: story.story_points,
        assignee: story.assignee.clone(),
        status: story.status,
    }
}
