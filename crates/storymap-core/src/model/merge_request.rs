use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::WorkflowStatus;

/// A merge request, the container that owns a forest of stories
///
/// Registered by the host; the engine owns only `story_ids` (the ordered
/// list of root stories) and the sync bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: WorkflowStatus,

    /// Repository full name, e.g. `owner/repo`
    pub repository: String,
    pub branch: String,

    /// Set when the remote branch diverged from what the map describes
    pub drift: bool,
    pub last_sync_at: Option<DateTime<Utc>>,

    /// Root story ids in sibling order
    pub story_ids: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MergeRequest {
    pub fn new(id: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            description: String::new(),
            status: WorkflowStatus::Draft,
            repository: String::new(),
            branch: String::new(),
            drift: false,
            last_sync_at: None,
            story_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_stories(&self) -> bool {
        !self.story_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_merge_request_is_empty_draft() {
        let mr = MergeRequest::new("mr-1".to_string(), "Checkout".to_string());
        assert_eq!(mr.status, WorkflowStatus::Draft);
        assert!(!mr.drift);
        assert!(mr.last_sync_at.is_none());
        assert!(!mr.has_stories());
    }
}
