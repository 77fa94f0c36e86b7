//! Field-level rules shared by every write path

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{Result, StoryMapError};
use crate::model::Assignee;

pub const MAX_STORY_POINTS: u8 = 100;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// The single e-mail predicate used across the engine.
///
/// Requires a dotted domain, so `user@localhost` is rejected.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// # Errors
///
/// Returns `Validation` for empty or whitespace-only titles.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(StoryMapError::validation(
            "title",
            "cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Absent estimates are allowed; present ones must be finite and non-negative.
///
/// # Errors
///
/// Returns `Validation` for NaN, infinite or negative estimates.
pub fn validate_estimate(estimate_days: Option<f64>) -> Result<()> {
    match estimate_days {
        Some(days) if !days.is_finite() => Err(StoryMapError::validation(
            "estimate_days",
            "must be a finite number",
        )),
        Some(days) if days < 0.0 => Err(StoryMapError::validation(
            "estimate_days",
            "cannot be negative",
        )),
        _ => Ok(()),
    }
}

/// # Errors
///
/// Returns `Validation` for an empty name or an e-mail failing `is_valid_email`.
pub fn validate_assignee(assignee: &Assignee) -> Result<()> {
    if assignee.name.trim().is_empty() {
        return Err(StoryMapError::validation("assignee.name", "cannot be empty"));
    }
    if !is_valid_email(&assignee.email) {
        return Err(StoryMapError::validation(
            "assignee.email",
            "is not a valid e-mail address",
        ));
    }
    Ok(())
}

/// Clamp host-supplied story points into `0..=100`.
pub fn clamp_story_points(points: i64) -> u8 {
    points.clamp(0, i64::from(MAX_STORY_POINTS)) as u8
}
