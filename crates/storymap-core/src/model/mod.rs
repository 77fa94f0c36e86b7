pub mod acceptance_test;
pub mod merge_request;
pub mod status;
pub mod story;

pub use acceptance_test::AcceptanceTest;
pub use merge_request::MergeRequest;
pub use status::{TestStatus, WorkflowStatus};
pub use story::{Assignee, Story};
