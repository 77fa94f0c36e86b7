//! Structured logging facility for the story map engine
//!
//! - Single initialization point via `init(profile)`
//! - Operation macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - In-memory capture layer for test assertions
//!
//! ```rust
//! use storymap_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Mutations and analyses are bracketed at the boundary that owns them
//! (`apply`, `build_rollup`, `evaluate_invest`, the snapshot importer), so a
//! single command yields exactly one start/end pair.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

use std::time::Instant;

use crate::errors::Result;

/// Run `f` bracketed by start/end events for `op`.
///
/// Used by boundaries that have no extra start fields to report.
pub fn with_op_logging<T>(op: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    crate::log_op_start!(op);
    let result = f();
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => crate::log_op_end!(op, duration_ms = duration_ms),
        Err(err) => crate::log_op_error!(op, err.clone(), duration_ms = duration_ms),
    }
    result
}
