use serde::Deserialize;

use super::{
    has_conjunction_chain, starts_with_phrase, GuidanceCheck, GuidanceLevel, GuidanceReport,
};
use crate::invest::Lexicon;

const MAX_I_WANT_CHARS: usize = 160;
const MIN_SO_THAT_CHARS: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoryDraft {
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
}

/// Coach an "As a / I want / So that" draft
pub fn evaluate_story_draft(draft: &StoryDraft, lexicon: &Lexicon) -> GuidanceReport {
    use GuidanceLevel::{Fail, Pass, Warn};

    let as_a = draft.as_a.trim();
    let i_want = draft.i_want.trim();
    let so_that = draft.so_that.trim();
    let mut checks = Vec::new();

    checks.push(if as_a.is_empty() {
        GuidanceCheck::new(
            "format-as-a",
            "As a statement",
            Fail,
            "Describe who benefits: start with \"As a ...\".",
        )
    } else if !starts_with_phrase(as_a, "as a") {
        GuidanceCheck::new(
            "format-as-a-prefix",
            "As a statement prefix",
            Warn,
            "Begin with \"As a ...\" to keep the template consistent.",
        )
    } else {
        GuidanceCheck::new("format-as-a-pass", "As a statement clarity", Pass, "Persona captured.")
    });

    if i_want.is_empty() {
        checks.push(GuidanceCheck::new(
            "format-i-want",
            "I want statement",
            Fail,
            "Explain the capability with \"I want ...\".",
        ));
    } else {
        if !starts_with_phrase(i_want, "i want") {
            checks.push(GuidanceCheck::new(
                "format-i-want-prefix",
                "I want statement prefix",
                Warn,
                "Begin with \"I want ...\".",
            ));
        }
        checks.push(if has_conjunction_chain(i_want) {
            GuidanceCheck::new(
                "invest-independent",
                "Independent",
                Warn,
                "Break multiple objectives into separate stories.",
            )
        } else {
            GuidanceCheck::new(
                "invest-independent-pass",
                "Independent",
                Pass,
                "Single focused outcome.",
            )
        });
        checks.push(if i_want.chars().count() > MAX_I_WANT_CHARS {
            GuidanceCheck::new(
                "invest-small",
                "Small",
                Warn,
                "Trim the scope to under 160 characters.",
            )
        } else {
            GuidanceCheck::new("invest-small-pass", "Small", Pass, "Scope appears manageable.")
        });
    }

    if so_that.is_empty() {
        checks.push(GuidanceCheck::new(
            "format-so-that",
            "So that statement",
            Fail,
            "Describe the measurable benefit with \"So that ...\".",
        ));
    } else {
        if !starts_with_phrase(so_that, "so that") {
            checks.push(GuidanceCheck::new(
                "format-so-that-prefix",
                "So that statement prefix",
                Warn,
                "Begin with \"So that ...\".",
            ));
        }
        checks.push(if so_that.chars().count() < MIN_SO_THAT_CHARS {
            GuidanceCheck::new(
                "invest-valuable",
                "Valuable",
                Warn,
                "Clarify the user or business value.",
            )
        } else {
            GuidanceCheck::new("invest-valuable-pass", "Valuable", Pass, "Outcome is articulated.")
        });
    }

    let vague = !lexicon.detect_ambiguity(i_want).is_empty()
        || !lexicon.detect_ambiguity(so_that).is_empty();
    checks.push(if vague {
        GuidanceCheck::new(
            "invest-testable",
            "Testable language",
            Warn,
            "Replace vague adjectives with observable outcomes.",
        )
    } else {
        GuidanceCheck::new(
            "invest-testable-pass",
            "Testable language",
            Pass,
            "Statements use concrete terms.",
        )
    });

    GuidanceReport::from_checks(
        checks,
        [
            "Update the story to satisfy the As a / I want / So that structure.",
            "Story is close; review the INVEST guidance before creating it.",
            "Story meets INVEST heuristics.",
        ],
    )
}
