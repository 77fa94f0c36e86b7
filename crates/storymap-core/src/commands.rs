//! Command inventory for the `apply()` boundary
//!
//! One variant per store mutation. Commands are plain data so hosts can
//! queue, log or replay them.

use chrono::{DateTime, Utc};

use crate::model::{TestStatus, WorkflowStatus};
use crate::ops::{MergeRequestInput, StoryInput, StoryPatch, TestInput, TestPatch};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    MergeRequestRegister(MergeRequestInput),

    MergeRequestSetStatus {
        mr_id: String,
        status: WorkflowStatus,
    },

    /// Repository sync outcome (drift flag plus sync time)
    MergeRequestRecordSync {
        mr_id: String,
        drift: bool,
        at: DateTime<Utc>,
    },

    StoryCreate(StoryInput),

    StoryUpdate {
        story_id: String,
        patch: StoryPatch,
    },

    /// Re-parent a story; `None` makes it a root. The index is clamped.
    StoryMove {
        story_id: String,
        new_parent_id: Option<String>,
        new_index: usize,
    },

    /// Cascading delete of the subtree and its tests
    StoryDelete { story_id: String },

    StoryReorderChildren {
        mr_id: String,
        parent_id: Option<String>,
        ordered_ids: Vec<String>,
    },

    TestCreate(TestInput),

    TestUpdate {
        test_id: String,
        patch: TestPatch,
    },

    TestSetStatus {
        test_id: String,
        status: TestStatus,
    },

    TestDelete { test_id: String },
}

impl Command {
    /// Operation name used in log events
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::MergeRequestRegister(_) => "register_merge_request",
            Command::MergeRequestSetStatus { .. } => "update_merge_request_status",
            Command::MergeRequestRecordSync { .. } => "record_sync",
            Command::StoryCreate(_) => "create_story",
            Command::StoryUpdate { .. } => "update_story_fields",
            Command::StoryMove { .. } => "move_story",
            Command::StoryDelete { .. } => "delete_story",
            Command::StoryReorderChildren { .. } => "reorder_children",
            Command::TestCreate(_) => "create_test",
            Command::TestUpdate { .. } => "update_test",
            Command::TestSetStatus { .. } => "update_test_status",
            Command::TestDelete { .. } => "delete_test",
        }
    }
}
