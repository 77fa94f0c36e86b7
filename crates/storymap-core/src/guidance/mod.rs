//! Pre-submit coaching for story, acceptance test and merge request drafts
//!
//! Unlike the INVEST evaluator these checks look only at the draft text,
//! so hosts can run them while the user is still typing.

pub mod acceptance;
pub mod merge_request;
pub mod story;

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub use acceptance::{evaluate_acceptance_draft, AcceptanceDraft};
pub use merge_request::{evaluate_merge_request_draft, MergeRequestDraft};
pub use story::{evaluate_story_draft, StoryDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceLevel {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuidanceCheck {
    pub id: &'static str,
    pub label: &'static str,
    pub level: GuidanceLevel,
    pub message: &'static str,
}

impl GuidanceCheck {
    fn new(
        id: &'static str,
        label: &'static str,
        level: GuidanceLevel,
        message: &'static str,
    ) -> Self {
        Self {
            id,
            label,
            level,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuidanceReport {
    pub summary: &'static str,
    pub level: GuidanceLevel,
    pub checks: Vec<GuidanceCheck>,
}

impl GuidanceReport {
    /// Worst level wins; the summary is picked per level.
    fn from_checks(checks: Vec<GuidanceCheck>, summaries: [&'static str; 3]) -> Self {
        let level = checks
            .iter()
            .map(|c| c.level)
            .max()
            .unwrap_or(GuidanceLevel::Pass);
        let summary = match level {
            GuidanceLevel::Fail => summaries[0],
            GuidanceLevel::Warn => summaries[1],
            GuidanceLevel::Pass => summaries[2],
        };
        Self {
            summary,
            level,
            checks,
        }
    }

    pub fn check(&self, id: &str) -> Option<&GuidanceCheck> {
        self.checks.iter().find(|c| c.id == id)
    }
}

fn conjunction_regex() -> &'static Regex {
    static CONJUNCTION: OnceLock<Regex> = OnceLock::new();
    CONJUNCTION
        .get_or_init(|| Regex::new(r"(?i)\b(?:and|or)\b").expect("conjunction pattern is valid"))
}

/// Several objectives joined by and/or
pub(crate) fn has_conjunction_chain(text: &str) -> bool {
    conjunction_regex().is_match(text)
}

/// Case-insensitive "starts with this phrase as whole words"
pub(crate) fn starts_with_phrase(text: &str, phrase: &str) -> bool {
    let lowered = text.trim_start().to_lowercase();
    match lowered.strip_prefix(phrase) {
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_alphanumeric()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_phrase() {
        assert!(starts_with_phrase("As a buyer", "as a"));
        assert!(starts_with_phrase("as a", "as a"));
        assert!(!starts_with_phrase("As an admin", "as a"));
        assert!(!starts_with_phrase("Buyer", "as a"));
    }

    #[test]
    fn test_conjunction_chain() {
        assert!(has_conjunction_chain("I want to pay and track orders"));
        assert!(!has_conjunction_chain("I want to pay with Android"));
    }

    #[test]
    fn test_report_level_is_worst_check() {
        let report = GuidanceReport::from_checks(
            vec![
                GuidanceCheck::new("a", "A", GuidanceLevel::Pass, "ok"),
                GuidanceCheck::new("b", "B", GuidanceLevel::Warn, "hm"),
            ],
            ["fail", "warn", "pass"],
        );
        assert_eq!(report.level, GuidanceLevel::Warn);
        assert_eq!(report.summary, "warn");
    }
}
