//! Canonical structured-logging keys and event names

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_MR_ID: &str = "mr_id";
pub const FIELD_STORY_ID: &str = "story_id";
pub const FIELD_TEST_ID: &str = "test_id";
pub const FIELD_PARENT_ID: &str = "parent_id";

// Result sizes
pub const FIELD_SUBTREE_LEN: &str = "subtree_len";
pub const FIELD_INVEST_PASSED: &str = "invest_passed";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
