//! Types shared by the StoryMap error and logging facilities
//!
//! - **Correlation ids**: `RequestId`
//! - **Redaction**: `Sensitive<T>` for values that must never reach a log line
//! - **Schema constants**: canonical structured-log field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RequestId;
pub use sensitive::Sensitive;
