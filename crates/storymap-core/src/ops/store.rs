use std::collections::HashMap;

use crate::errors::{Result, StoryMapError};
use crate::model::{AcceptanceTest, MergeRequest, Story};

/// In-memory store for merge requests, stories and acceptance tests
///
/// HashMap-backed and not internally locked. Cloning is the unit of
/// atomicity: `apply` works on an owned copy and hands it back only on
/// success.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    pub(crate) merge_requests: HashMap<String, MergeRequest>,
    pub(crate) stories: HashMap<String, Story>,
    pub(crate) tests: HashMap<String, AcceptanceTest>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `MergeRequestNotFound` if no merge request has this id.
    pub fn get_merge_request(&self, id: &str) -> Result<&MergeRequest> {
        self.merge_requests
            .get(id)
            .ok_or_else(|| StoryMapError::MergeRequestNotFound {
                mr_id: id.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `MergeRequestNotFound` if no merge request has this id.
    pub fn get_merge_request_mut(&mut self, id: &str) -> Result<&mut MergeRequest> {
        self.merge_requests
            .get_mut(id)
            .ok_or_else(|| StoryMapError::MergeRequestNotFound {
                mr_id: id.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `StoryNotFound` if no story has this id.
    pub fn get_story(&self, id: &str) -> Result<&Story> {
        self.stories
            .get(id)
            .ok_or_else(|| StoryMapError::StoryNotFound {
                story_id: id.to_string(),
            })
    }

    /// Public so tests can build deliberately corrupt trees.
    ///
    /// # Errors
    ///
    /// Returns `StoryNotFound` if no story has this id.
    pub fn get_story_mut(&mut self, id: &str) -> Result<&mut Story> {
        self.stories
            .get_mut(id)
            .ok_or_else(|| StoryMapError::StoryNotFound {
                story_id: id.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `TestNotFound` if no acceptance test has this id.
    pub fn get_test(&self, id: &str) -> Result<&AcceptanceTest> {
        self.tests
            .get(id)
            .ok_or_else(|| StoryMapError::TestNotFound {
                test_id: id.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `TestNotFound` if no acceptance test has this id.
    pub fn get_test_mut(&mut self, id: &str) -> Result<&mut AcceptanceTest> {
        self.tests
            .get_mut(id)
            .ok_or_else(|| StoryMapError::TestNotFound {
                test_id: id.to_string(),
            })
    }

    /// All merge requests sorted by id
    pub fn list_merge_requests(&self) -> Vec<&MergeRequest> {
        let mut mrs: Vec<_> = self.merge_requests.values().collect();
        mrs.sort_by(|a, b| a.id.cmp(&b.id));
        mrs
    }

    /// All stories sorted by id
    pub fn list_stories(&self) -> Vec<&Story> {
        let mut stories: Vec<_> = self.stories.values().collect();
        stories.sort_by(|a, b| a.id.cmp(&b.id));
        stories
    }

    /// All acceptance tests sorted by id
    pub fn list_tests(&self) -> Vec<&AcceptanceTest> {
        let mut tests: Vec<_> = self.tests.values().collect();
        tests.sort_by(|a, b| a.id.cmp(&b.id));
        tests
    }

    /// Root stories of a merge request in sibling order
    ///
    /// # Errors
    ///
    /// Returns `MergeRequestNotFound` or `StoryNotFound` for dangling ids.
    pub fn roots_of(&self, mr_id: &str) -> Result<Vec<&Story>> {
        self.get_merge_request(mr_id)?
            .story_ids
            .iter()
            .map(|id| self.get_story(id))
            .collect()
    }

    /// Child stories in sibling order
    ///
    /// # Errors
    ///
    /// Returns `StoryNotFound` if the story or one of its children is missing.
    pub fn children_of(&self, story_id: &str) -> Result<Vec<&Story>> {
        self.get_story(story_id)?
            .child_ids
            .iter()
            .map(|id| self.get_story(id))
            .collect()
    }

    /// Acceptance tests of a story in attachment order
    ///
    /// # Errors
    ///
    /// Returns `StoryNotFound` or `TestNotFound` for dangling ids.
    pub fn tests_of(&self, story_id: &str) -> Result<Vec<&AcceptanceTest>> {
        self.get_story(story_id)?
            .test_ids
            .iter()
            .map(|id| self.get_test(id))
            .collect()
    }

    pub fn insert_merge_request(&mut self, mr: MergeRequest) {
        self.merge_requests.insert(mr.id.clone(), mr);
    }

    pub fn insert_story(&mut self, story: Story) {
        self.stories.insert(story.id.clone(), story);
    }

    pub fn insert_test(&mut self, test: AcceptanceTest) {
        self.tests.insert(test.id.clone(), test);
    }

    pub fn story_count(&self) -> usize {
        self.stories.len()
    }

    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    pub(crate) fn story_exists(&self, id: &str) -> bool {
        self.stories.contains_key(id)
    }

    pub(crate) fn id_in_use(&self, id: &str) -> bool {
        self.merge_requests.contains_key(id)
            || self.stories.contains_key(id)
            || self.tests.contains_key(id)
    }

    /// Ordered sibling list a story with this placement lives in: the
    /// parent's `child_ids`, or the merge request's `story_ids` for roots.
    pub(crate) fn sibling_ids(&self, mr_id: &str, parent_id: Option<&str>) -> Result<&Vec<String>> {
        match parent_id {
            Some(pid) => Ok(&self.get_story(pid)?.child_ids),
            None => Ok(&self.get_merge_request(mr_id)?.story_ids),
        }
    }

    pub(crate) fn sibling_ids_mut(
        &mut self,
        mr_id: &str,
        parent_id: Option<&str>,
    ) -> Result<&mut Vec<String>> {
        match parent_id {
            Some(pid) => Ok(&mut self.get_story_mut(pid)?.child_ids),
            None => Ok(&mut self.get_merge_request_mut(mr_id)?.story_ids),
        }
    }

    /// Rewrite `order` to match list position for one sibling list.
    ///
    /// Returns the ids whose order actually changed.
    pub(crate) fn renumber_siblings(
        &mut self,
        mr_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<String>> {
        let ids = self.sibling_ids(mr_id, parent_id)?.clone();
        let mut changed = Vec::new();
        for (index, id) in ids.iter().enumerate() {
            let story = self.get_story_mut(id)?;
            let order = index as u32;
            if story.order != order {
                story.order = order;
                changed.push(id.clone());
            }
        }
        Ok(changed)
    }
}

/// Human-readable label for a sibling list, used in invariant errors
pub(crate) fn container_label(mr_id: &str, parent_id: Option<&str>) -> String {
    match parent_id {
        Some(pid) => format!("story:{}", pid),
        None => format!("merge_request:{}", mr_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_roots(ids: &[&str]) -> Store {
        let mut store = Store::new();
        let mut mr = MergeRequest::new("mr-1".to_string(), "MR".to_string());
        for (i, id) in ids.iter().enumerate() {
            let mut story = Story::new(id.to_string(), "mr-1".to_string(), id.to_string());
            story.order = (ids.len() - i) as u32;
            store.insert_story(story);
            mr.story_ids.push(id.to_string());
        }
        store.insert_merge_request(mr);
        store
    }

    #[test]
    fn test_missing_records_are_typed_not_found() {
        let store = Store::new();
        assert!(matches!(
            store.get_merge_request("x"),
            Err(StoryMapError::MergeRequestNotFound { .. })
        ));
        assert!(matches!(
            store.get_story("x"),
            Err(StoryMapError::StoryNotFound { .. })
        ));
        assert!(matches!(
            store.get_test("x"),
            Err(StoryMapError::TestNotFound { .. })
        ));
    }

    #[test]
    fn test_renumber_siblings_reports_changes_only() {
        let mut store = store_with_roots(&["a", "b", "c"]);
        store.get_story_mut("b").unwrap().order = 1;

        let changed = store.renumber_siblings("mr-1", None).unwrap();

        assert_eq!(changed, vec!["a".to_string(), "c".to_string()]);
        let orders: Vec<u32> = store
            .roots_of("mr-1")
            .unwrap()
            .iter()
            .map(|s| s.order)
            .collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_list_stories_sorted_by_id() {
        let store = store_with_roots(&["c", "a", "b"]);
        let ids: Vec<&str> = store.list_stories().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_container_label() {
        assert_eq!(container_label("mr-1", None), "merge_request:mr-1");
        assert_eq!(container_label("mr-1", Some("s1")), "story:s1");
    }
}
