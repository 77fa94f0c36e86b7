use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::Store;
use crate::errors::{Result, StoryMapError};
use crate::model::{AcceptanceTest, TestStatus};
use crate::rules::fields::validate_title;

/// Creation payload for an acceptance test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestInput {
    #[serde(default)]
    pub id: Option<String>,
    pub story_id: String,
    pub title: String,
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub then: String,
    #[serde(default)]
    pub status: TestStatus,
}

/// Partial update of an acceptance test's text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestPatch {
    pub title: Option<String>,
    pub given: Option<String>,
    pub when: Option<String>,
    pub then: Option<String>,
}

/// Attach a new acceptance test to a story
///
/// # Errors
/// * `StoryNotFound` - unknown owning story
/// * `Validation` - empty title or empty host-supplied id
/// * `AlreadyExists` - host-supplied id already in use
pub fn create_test(store: &mut Store, input: TestInput) -> Result<AcceptanceTest> {
    validate_title(&input.title)?;
    store.get_story(&input.story_id)?;

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

    let mut test = AcceptanceTest::new(id.clone(), input.story_id.clone(), input.title.trim().to_string());
    test.given = input.given;
    test.when = input.when;
    test.then = input.then;
    test.status = input.status;

    store.get_story_mut(&input.story_id)?.test_ids.push(id);
    store.insert_test(test.clone());
    Ok(test)
}

/// # Errors
/// * `TestNotFound` - unknown test
/// * `Validation` - empty title
pub fn update_test(store: &mut Store, test_id: &str, patch: TestPatch) -> Result<AcceptanceTest> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }

    let test = store.get_test_mut(test_id)?;
    if let Some(title) = patch.title {
        test.title = title.trim().to_string();
    }
    if let Some(given) = patch.given {
        test.given = given;
    }
    if let Some(when) = patch.when {
        test.when = when;
    }
    if let Some(then) = patch.then {
        test.then = then;
    }
    test.touch();
    Ok(test.clone())
}

/// # Errors
/// * `TestNotFound` - unknown test
pub fn update_test_status(
    store: &mut Store,
    test_id: &str,
    status: TestStatus,
) -> Result<AcceptanceTest> {
    let test = store.get_test_mut(test_id)?;
    test.status = status;
    test.touch();
    Ok(test.clone())
}

/// Remove a test and unlink it from its story
///
/// # Errors
/// * `TestNotFound` - unknown test
pub fn delete_test(store: &mut Store, test_id: &str) -> Result<AcceptanceTest> {
    let story_id = store.get_test(test_id)?.story_id.clone();
    if let Ok(story) = store.get_story_mut(&story_id) {
        story.test_ids.retain(|id| id != test_id);
    }
    store
        .tests
        .remove(test_id)
        .ok_or_else(|| StoryMapError::TestNotFound {
            test_id: test_id.to_string(),
        })
}
