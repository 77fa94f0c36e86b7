use storymap_core::ops::{
    create_story, create_test, register_merge_request, MergeRequestInput, StoryInput, TestInput,
};
use storymap_core::rules::validate_tree;
use storymap_core::Store;

/// Store holding one merge request with the given id
#[allow(dead_code)]
pub fn store_with_mr(mr_id: &str) -> Store {
    let mut store = Store::new();
    add_merge_request(&mut store, mr_id);
    store
}

#[allow(dead_code)]
pub fn add_merge_request(store: &mut Store, mr_id: &str) {
    register_merge_request(
        store,
        MergeRequestInput {
            id: Some(mr_id.to_string()),
            title: format!("Merge request {}", mr_id),
            repository: "acme/shop".to_string(),
            branch: "feature/checkout".to_string(),
            ..Default::default()
        },
    )
    .unwrap();
}

/// Add a bare story (title = id) under `parent`, or as a root when `None`
#[allow(dead_code)]
pub fn add_story(store: &mut Store, mr_id: &str, id: &str, parent: Option<&str>) {
    create_story(store, story_input(mr_id, id, parent)).unwrap();
}

#[allow(dead_code)]
pub fn story_input(mr_id: &str, id: &str, parent: Option<&str>) -> StoryInput {
    StoryInput {
        id: Some(id.to_string()),
        mr_id: mr_id.to_string(),
        parent_id: parent.map(str::to_string),
        title: id.to_string(),
        ..Default::default()
    }
}

/// Story that passes every INVEST criterion once it has a complete test
#[allow(dead_code)]
pub fn well_formed_story(mr_id: &str, id: &str) -> StoryInput {
    StoryInput {
        as_a: "finance analyst".to_string(),
        i_want: "to export the monthly report as CSV".to_string(),
        so_that: "I can reconcile accounts in my spreadsheet".to_string(),
        estimate_days: Some(1.5),
        ..story_input(mr_id, id, None)
    }
}

/// Attach a complete Given/When/Then test
#[allow(dead_code)]
pub fn add_test(store: &mut Store, story_id: &str, id: &str) {
    create_test(
        store,
        TestInput {
            id: Some(id.to_string()),
            story_id: story_id.to_string(),
            title: format!("Test {}", id),
            given: "a closed month".to_string(),
            when: "I click export".to_string(),
            then: "a CSV downloads within 5 seconds".to_string(),
            ..Default::default()
        },
    )
    .unwrap();
}

#[allow(dead_code)]
pub fn child_ids(store: &Store, story_id: &str) -> Vec<String> {
    store.get_story(story_id).unwrap().child_ids.clone()
}

#[allow(dead_code)]
pub fn assert_tree_valid(store: &Store) {
    if let Err(err) = validate_tree(store) {
        panic!("tree invariants broken: {}", err);
    }
}
