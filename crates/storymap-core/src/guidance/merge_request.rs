use serde::Deserialize;

use super::{GuidanceCheck, GuidanceLevel, GuidanceReport};
use crate::invest::Lexicon;

const MIN_SUMMARY_CHARS: usize = 40;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MergeRequestDraft {
    pub title: String,
    pub summary: String,
}

/// Coach a merge request title and summary
pub fn evaluate_merge_request_draft(
    draft: &MergeRequestDraft,
    lexicon: &Lexicon,
) -> GuidanceReport {
    use GuidanceLevel::{Fail, Pass, Warn};

    let title = draft.title.trim();
    let summary = draft.summary.trim();
    let mut checks = Vec::new();

    checks.push(if title.is_empty() {
        GuidanceCheck::new(
            "title",
            "Title present",
            Fail,
            "Provide a title that communicates the initiative.",
        )
    } else {
        GuidanceCheck::new("title-pass", "Title clarity", Pass, "Title present.")
    });

    if summary.is_empty() {
        checks.push(GuidanceCheck::new(
            "summary",
            "Summary detail",
            Fail,
            "Summarize the scope so stories can be derived from it.",
        ));
    } else {
        checks.push(if summary.chars().count() < MIN_SUMMARY_CHARS {
            GuidanceCheck::new(
                "summary-length",
                "Summary depth",
                Warn,
                "Add more detail so the team understands the intent.",
            )
        } else {
            GuidanceCheck::new(
                "summary-pass",
                "Summary depth",
                Pass,
                "Summary provides actionable context.",
            )
        });
        if !lexicon.detect_ambiguity(summary).is_empty() {
            checks.push(GuidanceCheck::new(
                "summary-clarity",
                "Avoid vague language",
                Warn,
                "Swap generic adjectives for concrete outcomes.",
            ));
        }
    }

    GuidanceReport::from_checks(
        checks,
        [
            "Complete the title and summary before creating the merge request.",
            "Draft is nearly ready; resolve the warnings to improve clarity.",
            "Draft has enough context to start planning user stories.",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_summary_warns() {
        let report = evaluate_merge_request_draft(
            &MergeRequestDraft {
                title: "Checkout".to_string(),
                summary: "Card payments".to_string(),
            },
            &Lexicon::default(),
        );
        assert_eq!(report.level, GuidanceLevel::Warn);
        assert!(report.check("summary-length").is_some());
    }

    #[test]
    fn test_empty_title_fails() {
        let report = evaluate_merge_request_draft(
            &MergeRequestDraft::default(),
            &Lexicon::default(),
        );
        assert_eq!(report.level, GuidanceLevel::Fail);
    }

    #[test]
    fn test_detailed_summary_passes() {
        let report = evaluate_merge_request_draft(
            &MergeRequestDraft {
                title: "Checkout".to_string(),
                summary: "Add saved-card payments to the checkout flow for returning shoppers"
                    .to_string(),
            },
            &Lexicon::default(),
        );
        assert_eq!(report.level, GuidanceLevel::Pass);
    }
}
