use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::WorkflowStatus;

/// Person a story is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub name: String,
    pub email: String,
}

/// A user story node in a merge request's hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub mr_id: String,

    /// None for a root story of its merge request
    pub parent_id: Option<String>,

    /// Position among siblings, contiguous from 0
    pub order: u32,

    /// 0 for roots, parent depth + 1 otherwise
    pub depth: u32,

    pub title: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,

    pub estimate_days: Option<f64>,
    pub story_points: Option<u8>,
    pub assignee: Option<Assignee>,
    pub status: WorkflowStatus,

    /// Child story ids in sibling order
    pub child_ids: Vec<String>,
    pub test_ids: Vec<String>,

    /// Bumped on every mutation that touches this record
    pub version: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    pub fn new(id: String, mr_id: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            mr_id,
            parent_id: None,
            order: 0,
            depth: 0,
            title,
            as_a: String::new(),
            i_want: String::new(),
            so_that: String::new(),
            estimate_days: None,
            story_points: None,
            assignee: None,
            status: WorkflowStatus::Draft,
            child_ids: Vec::new(),
            test_ids: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.child_ids.is_empty()
    }

    /// Narrative fields joined for lexical analysis
    pub fn narrative(&self) -> String {
        format!("{} {} {}", self.as_a, self.i_want, self.so_that)
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
