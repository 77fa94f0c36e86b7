pub mod move_ops;
pub mod mr_ops;
pub mod store;
pub mod story_ops;
pub mod test_ops;

pub use move_ops::{move_story, reorder_children, MoveReport};
pub use mr_ops::{record_sync, register_merge_request, update_merge_request_status, MergeRequestInput};
pub use store::Store;
pub use story_ops::{
    collect_subtree, create_story, delete_story, story_path, update_story_fields, DeletedSubtree,
    StoryInput, StoryPatch,
};
pub use test_ops::{create_test, delete_test, update_test, update_test_status, TestInput, TestPatch};
