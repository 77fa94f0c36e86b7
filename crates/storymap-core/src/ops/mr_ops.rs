use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::Store;
use crate::errors::{Result, StoryMapError};
use crate::model::{MergeRequest, WorkflowStatus};
use crate::rules::fields::validate_title;

/// Registration payload for a merge request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeRequestInput {
    /// Host-supplied id; a UUID v7 is generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub status: WorkflowStatus,
}

/// Register a merge request with an empty root list
///
/// # Errors
/// * `Validation` - empty title or empty host-supplied id
/// * `AlreadyExists` - host-supplied id already in use
pub fn register_merge_request(store: &mut Store, input: MergeRequestInput) -> Result<MergeRequest> {
    validate_title(&input.title)?;

    let id = match input.id {
        Some(id) if id.trim().is_empty() => {
            return Err(StoryMapError::validation("id", "cannot be empty"));
        }
        Some(id) if store.id_in_use(&id) => {
            return Err(StoryMapError::AlreadyExists { entity_id: id });
        }
        Some(id) => id,
        None => Uuid::now_v7().to_string(),
    };

    let mut mr = MergeRequest::new(id, input.title.trim().to_string());
    mr.description = input.description;
    mr.repository = input.repository;
    mr.branch = input.branch;
    mr.status = input.status;

    tracing::debug!(mr_id = %mr.id, repository = %mr.repository, "merge request registered");
    store.insert_merge_request(mr.clone());
    Ok(mr)
}

/// # Errors
/// * `MergeRequestNotFound` - no merge request with this id
pub fn update_merge_request_status(
    store: &mut Store,
    mr_id: &str,
    status: WorkflowStatus,
) -> Result<MergeRequest> {
    let mr = store.get_merge_request_mut(mr_id)?;
    mr.status = status;
    mr.updated_at = Utc::now();
    Ok(mr.clone())
}

/// Record the outcome of a repository sync (webhook delivery)
///
/// Sets the drift flag and the last-sync timestamp.
///
/// # Errors
/// * `MergeRequestNotFound` - no merge request with this id
pub fn record_sync(
    store: &mut Store,
    mr_id: &str,
    drift: bool,
    at: DateTime<Utc>,
) -> Result<MergeRequest> {
    let mr = store.get_merge_request_mut(mr_id)?;
    mr.drift = drift;
    mr.last_sync_at = Some(at);
    mr.updated_at = Utc::now();
    tracing::debug!(mr_id, drift, "merge request sync recorded");
    Ok(mr.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: Option<&str>, title: &str) -> MergeRequestInput {
        MergeRequestInput {
            id: id.map(str::to_string),
            title: title.to_string(),
            repository: "acme/shop".to_string(),
            branch: "feature/checkout".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_register_generates_id_when_absent() {
        let mut store = Store::new();
        let mr = register_merge_request(&mut store, input(None, "Checkout")).unwrap();

        assert!(!mr.id.is_empty());
        assert_eq!(store.get_merge_request(&mr.id).unwrap().repository, "acme/shop");
    }

    #[test]
    fn test_register_rejects_duplicate_id_and_empty_title() {
        let mut store = Store::new();
        register_merge_request(&mut store, input(Some("mr-1"), "Checkout")).unwrap();

        assert!(matches!(
            register_merge_request(&mut store, input(Some("mr-1"), "Again")),
            Err(StoryMapError::AlreadyExists { .. })
        ));
        assert!(matches!(
            register_merge_request(&mut store, input(Some("mr-2"), "  ")),
            Err(StoryMapError::Validation { .. })
        ));
    }

    #[test]
    fn test_record_sync_sets_drift_and_timestamp() {
        let mut store = Store::new();
        register_merge_request(&mut store, input(Some("mr-1"), "Checkout")).unwrap();
        let at = Utc::now();

        let mr = record_sync(&mut store, "mr-1", true, at).unwrap();

        assert!(mr.drift);
        assert_eq!(mr.last_sync_at, Some(at));
    }

    #[test]
    fn test_status_update_on_missing_mr() {
        let mut store = Store::new();
        assert!(matches!(
            update_merge_request_status(&mut store, "nope", WorkflowStatus::Done),
            Err(StoryMapError::MergeRequestNotFound { .. })
        ));
    }
}
