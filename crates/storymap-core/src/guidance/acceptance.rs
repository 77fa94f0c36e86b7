use serde::Deserialize;

use super::{starts_with_phrase, GuidanceCheck, GuidanceLevel, GuidanceReport};
use crate::invest::Lexicon;

const PLACEHOLDERS: [&str; 3] = ["tbd", "todo", "lorem"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AcceptanceDraft {
    pub title: String,
    pub given: String,
    pub when: String,
    pub then: String,
}

/// Coach a Given/When/Then draft
pub fn evaluate_acceptance_draft(draft: &AcceptanceDraft, lexicon: &Lexicon) -> GuidanceReport {
    use GuidanceLevel::{Fail, Pass, Warn};

    let given = draft.given.trim();
    let when = draft.when.trim();
    let then = draft.then.trim();
    let mut checks = Vec::new();

    if draft.title.trim().is_empty() {
        checks.push(GuidanceCheck::new(
            "title",
            "Test title",
            Warn,
            "Provide a short descriptive title for traceability.",
        ));
    }

    let clauses: [(&str, &str, [GuidanceCheck; 3]); 3] = [
        (
            given,
            "given",
            [
                GuidanceCheck::new(
                    "given",
                    "Given clause",
                    Fail,
                    "Define the precondition starting with \"Given ...\".",
                ),
                GuidanceCheck::new(
                    "given-prefix",
                    "Given clause prefix",
                    Warn,
                    "Prefix the step with \"Given ...\".",
                ),
                GuidanceCheck::new(
                    "given-pass",
                    "Given clause clarity",
                    Pass,
                    "Precondition captured.",
                ),
            ],
        ),
        (
            when,
            "when",
            [
                GuidanceCheck::new(
                    "when",
                    "When clause",
                    Fail,
                    "Describe the trigger using \"When ...\".",
                ),
                GuidanceCheck::new(
                    "when-prefix",
                    "When clause prefix",
                    Warn,
                    "Prefix the step with \"When ...\".",
                ),
                GuidanceCheck::new("when-pass", "When clause clarity", Pass, "Trigger is clear."),
            ],
        ),
        (
            then,
            "then",
            [
                GuidanceCheck::new(
                    "then",
                    "Then clause",
                    Fail,
                    "Describe the observable outcome using \"Then ...\".",
                ),
                GuidanceCheck::new(
                    "then-prefix",
                    "Then clause prefix",
                    Warn,
                    "Prefix the step with \"Then ...\".",
                ),
                GuidanceCheck::new(
                    "then-pass",
                    "Then clause clarity",
                    Pass,
                    "Outcome is observable.",
                ),
            ],
        ),
    ];
    for (text, keyword, [missing, unprefixed, ok]) in clauses {
        checks.push(if text.is_empty() {
            missing
        } else if !starts_with_phrase(text, keyword) {
            unprefixed
        } else {
            ok
        });
    }

    let combined = format!("{} {} {}", given, when, then).to_lowercase();
    if PLACEHOLDERS.iter().any(|token| combined.contains(token)) {
        checks.push(GuidanceCheck::new(
            "placeholders",
            "Placeholder text",
            Fail,
            "Remove placeholder text such as TBD/TODO.",
        ));
    }

    checks.push(if !lexicon.detect_ambiguity(then).is_empty() {
        GuidanceCheck::new(
            "testable",
            "Observable outcome",
            Warn,
            "Clarify measurable results so the test stays verifiable.",
        )
    } else {
        GuidanceCheck::new("testable-pass", "Observable outcome", Pass, "Result is verifiable.")
    });

    GuidanceReport::from_checks(
        checks,
        [
            "Address the failing Given/When/Then guidance before attaching the test.",
            "Acceptance test is almost ready; tighten the highlighted warnings.",
            "Acceptance test draft satisfies Given/When/Then heuristics.",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_draft_passes() {
        let draft = AcceptanceDraft {
            title: "Saved card".to_string(),
            given: "Given a saved card".to_string(),
            when: "When I check out".to_string(),
            then: "Then payment completes within 3 seconds".to_string(),
        };
        assert_eq!(
            evaluate_acceptance_draft(&draft, &Lexicon::default()).level,
            GuidanceLevel::Pass
        );
    }

    #[test]
    fn test_placeholder_fails() {
        let draft = AcceptanceDraft {
            title: "x".to_string(),
            given: "Given TBD".to_string(),
            when: "When I check out".to_string(),
            then: "Then it works".to_string(),
        };
        let report = evaluate_acceptance_draft(&draft, &Lexicon::default());
        assert_eq!(report.level, GuidanceLevel::Fail);
        assert!(report.check("placeholders").is_some());
    }

    #[test]
    fn test_missing_prefix_and_title_warn() {
        let draft = AcceptanceDraft {
            title: " ".to_string(),
            given: "a saved card".to_string(),
            when: "When I check out".to_string(),
            then: "Then it should be quick".to_string(),
        };
        let report = evaluate_acceptance_draft(&draft, &Lexicon::default());
        assert_eq!(report.level, GuidanceLevel::Warn);
        assert!(report.check("title").is_some());
        assert!(report.check("given-prefix").is_some());
        assert!(report.check("testable").is_some());
    }
}
