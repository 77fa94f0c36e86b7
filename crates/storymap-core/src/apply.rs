//! Functional-boundary apply function
//!
//! `apply()` takes the store by value, runs one command and hands back the
//! new state together with what the caller needs to refresh its views: the
//! affected rollup roots and, for story-level changes, a fresh INVEST
//! analysis.
//!
//! ## Atomicity Contract
//!
//! - **All-or-nothing**: on `Err` the consumed state is dropped; a caller
//!   that kept a clone still holds the unchanged pre-command store
//! - **No panics**: invalid input returns typed errors
//! - **Policy gate**: with `InvestPolicy::Block`, a story create or update
//!   whose analysis classifies as `block` is rejected with `InvestRejected`
//!
//! ## Example
//!
//! ```
//! use storymap_core::{apply, ApplyOptions, Command, Store};
//! use storymap_core::ops::{MergeRequestInput, StoryInput};
//!
//! let options = ApplyOptions::default();
//! let applied = apply(
//!     Store::new(),
//!     Command::MergeRequestRegister(MergeRequestInput {
//!         id: Some("mr-1".to_string()),
//!         title: "Checkout".to_string(),
//!         ..Default::default()
//!     }),
//!     &options,
//! )
//! .unwrap();
//!
//! let applied = apply(
//!     applied.store,
//!     Command::StoryCreate(StoryInput {
//!         mr_id: "mr-1".to_string(),
//!         title: "Pay by card".to_string(),
//!         ..Default::default()
//!     }),
//!     &options,
//! )
//! .unwrap();
//!
//! assert_eq!(applied.store.story_count(), 1);
//! assert!(applied.invest.is_some());
//! ```

use std::time::Instant;

use crate::commands::Command;
use crate::config::StoryMapConfig;
use crate::errors::{Result, StoryMapError};
use crate::invest::{evaluate_invest, InvestAnalysis, InvestClassification, InvestOptions, Lexicon};
use crate::ops::{self, Store};
use crate::rollup::affected_roots;
use crate::{log_op_end, log_op_error, log_op_start};

/// Evaluation settings used by `apply()`
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub invest: InvestOptions,
    pub lexicon: Lexicon,
}

impl ApplyOptions {
    /// # Errors
    /// * `Validation` - the configured lexicon does not compile
    pub fn from_config(config: &StoryMapConfig) -> Result<Self> {
        Ok(Self {
            invest: config.invest.clone(),
            lexicon: config.lexicon()?,
        })
    }
}

/// Outcome of a successful command
#[derive(Debug, Clone)]
pub struct Applied {
    pub store: Store,
    /// Id of the created or changed record, if the command names one
    pub entity_id: Option<String>,
    /// Fresh analysis of the story the command changed
    pub invest: Option<InvestAnalysis>,
    /// Root stories whose rollups are stale after this command
    pub affected_roots: Vec<String>,
}

impl Applied {
    fn new(store: Store) -> Self {
        Self {
            store,
            entity_id: None,
            invest: None,
            affected_roots: Vec::new(),
        }
    }
}

/// Apply a command to a store, returning the new state
///
/// # Errors
///
/// Any error of the underlying operation (see `StoryMapError`), plus
/// `InvestRejected` when the block policy rejects a story write.
pub fn apply(state: Store, cmd: Command, options: &ApplyOptions) -> Result<Applied> {
    let op = cmd.op_name();
    let start = Instant::now();
    log_op_start!(op);

    let result = execute(state, cmd, options);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(applied) => log_op_end!(
            op,
            duration_ms = duration_ms,
            entity_id = applied.entity_id.as_deref().unwrap_or_default(),
            affected_roots = applied.affected_roots.len()
        ),
        Err(err) => log_op_error!(op, err.clone(), duration_ms = duration_ms),
    }
    result
}

fn execute(mut state: Store, cmd: Command, options: &ApplyOptions) -> Result<Applied> {
    match cmd {
        Command::MergeRequestRegister(input) => {
            let mr = ops::register_merge_request(&mut state, input)?;
            let mut applied = Applied::new(state);
            applied.entity_id = Some(mr.id);
            Ok(applied)
        }

        Command::MergeRequestSetStatus { mr_id, status } => {
            ops::update_merge_request_status(&mut state, &mr_id, status)?;
            let mut applied = Applied::new(state);
            applied.entity_id = Some(mr_id);
            Ok(applied)
        }

        Command::MergeRequestRecordSync { mr_id, drift, at } => {
            ops::record_sync(&mut state, &mr_id, drift, at)?;
            let mut applied = Applied::new(state);
            applied.entity_id = Some(mr_id);
            Ok(applied)
        }

        Command::StoryCreate(input) => {
            let story = ops::create_story(&mut state, input)?;
            gated_story_write(state, story.id, options)
        }

        Command::StoryUpdate { story_id, patch } => {
            ops::update_story_fields(&mut state, &story_id, patch)?;
            gated_story_write(state, story_id, options)
        }

        Command::StoryMove {
            story_id,
            new_parent_id,
            new_index,
        } => {
            let report =
                ops::move_story(&mut state, &story_id, new_parent_id.as_deref(), new_index)?;
            let mut stale = report.touched.clone();
            stale.extend(report.old_parent_id.iter().cloned());
            stale.push(story_id.clone());
            let roots = affected_roots(&state, &stale)?;
            let analysis = evaluate_invest(&state, &story_id, &options.invest, &options.lexicon)?;
            Ok(Applied {
                store: state,
                entity_id: Some(story_id),
                invest: Some(analysis),
                affected_roots: roots,
            })
        }

        Command::StoryDelete { story_id } => {
            let parent_id = state.get_story(&story_id)?.parent_id.clone();
            let deleted = ops::delete_story(&mut state, &story_id)?;
            let mut stale = deleted.renumbered;
            stale.extend(parent_id);
            let roots = affected_roots(&state, &stale)?;
            let mut applied = Applied::new(state);
            applied.entity_id = Some(story_id);
            applied.affected_roots = roots;
            Ok(applied)
        }

        Command::StoryReorderChildren {
            mr_id,
            parent_id,
            ordered_ids,
        } => {
            let changed =
                ops::reorder_children(&mut state, &mr_id, parent_id.as_deref(), ordered_ids)?;
            let roots = affected_roots(&state, &changed)?;
            let mut applied = Applied::new(state);
            applied.entity_id = parent_id.or(Some(mr_id));
            applied.affected_roots = roots;
            Ok(applied)
        }

        Command::TestCreate(input) => {
            let test = ops::create_test(&mut state, input)?;
            test_write(state, test.id, test.story_id, options)
        }

        Command::TestUpdate { test_id, patch } => {
            let test = ops::update_test(&mut state, &test_id, patch)?;
            test_write(state, test.id, test.story_id, options)
        }

        Command::TestSetStatus { test_id, status } => {
            let test = ops::update_test_status(&mut state, &test_id, status)?;
            test_write(state, test.id, test.story_id, options)
        }

        Command::TestDelete { test_id } => {
            let test = ops::delete_test(&mut state, &test_id)?;
            test_write(state, test.id, test.story_id, options)
        }
    }
}

/// Score a freshly written story and enforce the block policy
fn gated_story_write(state: Store, story_id: String, options: &ApplyOptions) -> Result<Applied> {
    let analysis = evaluate_invest(&state, &story_id, &options.invest, &options.lexicon)?;
    if analysis.classification == InvestClassification::Block {
        return Err(StoryMapError::InvestRejected {
            story_id,
            failed: analysis
                .failed_criteria()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        });
    }

    let roots = affected_roots(&state, std::slice::from_ref(&story_id))?;
    Ok(Applied {
        store: state,
        entity_id: Some(story_id),
        invest: Some(analysis),
        affected_roots: roots,
    })
}

/// A test change re-scores its owning story (Testable may flip)
fn test_write(
    state: Store,
    test_id: String,
    story_id: String,
    options: &ApplyOptions,
) -> Result<Applied> {
    let analysis = evaluate_invest(&state, &story_id, &options.invest, &options.lexicon)?;
    let roots = affected_roots(&state, std::slice::from_ref(&story_id))?;
    Ok(Applied {
        store: state,
        entity_id: Some(test_id),
        invest: Some(analysis),
        affected_roots: roots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invest::InvestPolicy;
    use crate::model::WorkflowStatus;
    use crate::ops::{MergeRequestInput, StoryInput, StoryPatch};

    fn with_mr() -> Store {
        apply(
            Store::new(),
            Command::MergeRequestRegister(MergeRequestInput {
                id: Some("mr-1".to_string()),
                title: "Checkout".to_string(),
                ..Default::default()
            }),
            &ApplyOptions::default(),
        )
        .unwrap()
        .store
    }

    fn story(id: &str, parent: Option<&str>) -> Command {
        Command::StoryCreate(StoryInput {
            id: Some(id.to_string()),
            mr_id: "mr-1".to_string(),
            parent_id: parent.map(str::to_string),
            title: id.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_create_reports_root_and_analysis() {
        let options = ApplyOptions::default();
        let store = apply(with_mr(), story("root", None), &options).unwrap().store;

        let applied = apply(store, story("child", Some("root")), &options).unwrap();

        assert_eq!(applied.entity_id.as_deref(), Some("child"));
        assert_eq!(applied.affected_roots, vec!["root".to_string()]);
        let analysis = applied.invest.unwrap();
        assert_eq!(analysis.classification, InvestClassification::Warn);
    }

    #[test]
    fn test_block_policy_rejects_and_leaves_retained_copy_untouched() {
        let options = ApplyOptions {
            invest: InvestOptions {
                policy: InvestPolicy::Block,
                ..Default::default()
            },
            ..Default::default()
        };
        let before = with_mr();

        let err = apply(before.clone(), story("weak", None), &options).unwrap_err();

        match err {
            StoryMapError::InvestRejected { story_id, failed } => {
                assert_eq!(story_id, "weak");
                assert!(failed.contains(&"testable".to_string()));
            }
            other => panic!("expected InvestRejected, got {:?}", other),
        }
        assert_eq!(before.story_count(), 0);
    }

    #[test]
    fn test_delete_reports_parent_root() {
        let options = ApplyOptions::default();
        let mut store = with_mr();
        for (id, parent) in [("r", None), ("a", Some("r")), ("b", Some("r"))] {
            store = apply(store, story(id, parent), &options).unwrap().store;
        }

        let applied = apply(
            store,
            Command::StoryDelete {
                story_id: "a".to_string(),
            },
            &options,
        )
        .unwrap();

        assert_eq!(applied.affected_roots, vec!["r".to_string()]);
        assert_eq!(applied.store.get_story("b").unwrap().order, 0);
    }

    #[test]
    fn test_update_on_missing_story_is_not_found() {
        let result = apply(
            with_mr(),
            Command::StoryUpdate {
                story_id: "ghost".to_string(),
                patch: StoryPatch {
                    status: Some(WorkflowStatus::Done),
                    ..Default::default()
                },
            },
            &ApplyOptions::default(),
        );
        assert!(matches!(result, Err(StoryMapError::StoryNotFound { .. })));
    }
}
