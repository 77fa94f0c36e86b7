use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;
use crate::errors::Result;
use crate::model::Story;
use crate::ops::Store;
use crate::{log_op_end, log_op_error, log_op_start};

/// Stories whose ids are shorter than this are not searched for in other
/// stories' narrative; short ids collide with ordinary words.
const MIN_REFERENCED_ID_LEN: usize = 8;

/// What a failing analysis means for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestPolicy {
    /// Report failures, accept the write
    #[default]
    Warn,
    /// Reject writes that fail any criterion
    Block,
}

/// Thresholds for the INVEST heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestOptions {
    pub small_children_threshold: usize,
    pub small_estimate_days: f64,
    pub max_depth: u32,
    pub valuable_min_words: usize,
    pub policy: InvestPolicy,
}

impl Default for InvestOptions {
    fn default() -> Self {
        Self {
            small_children_threshold: 5,
            small_estimate_days: 2.0,
            max_depth: 4,
            valuable_min_words: 3,
            policy: InvestPolicy::Warn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestCriterion {
    Independent,
    Negotiable,
    Valuable,
    Estimable,
    Small,
    Testable,
}

impl InvestCriterion {
    pub const ALL: [InvestCriterion; 6] = [
        InvestCriterion::Independent,
        InvestCriterion::Negotiable,
        InvestCriterion::Valuable,
        InvestCriterion::Estimable,
        InvestCriterion::Small,
        InvestCriterion::Testable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestCriterion::Independent => "independent",
            InvestCriterion::Negotiable => "negotiable",
            InvestCriterion::Valuable => "valuable",
            InvestCriterion::Estimable => "estimable",
            InvestCriterion::Small => "small",
            InvestCriterion::Testable => "testable",
        }
    }

    /// Stable message code, `invest.<criterion>`
    pub fn code(&self) -> String {
        format!("invest.{}", self.as_str())
    }

    fn suggestion(&self) -> &'static str {
        match self {
            InvestCriterion::Independent => {
                "Remove references to other stories so this one can ship on its own."
            }
            InvestCriterion::Negotiable => {
                "Replace vague or prescriptive wording with the outcome you need."
            }
            InvestCriterion::Valuable => "Explain the benefit in the 'so that' clause.",
            InvestCriterion::Estimable => {
                "Add a positive estimate and quantify vague terms with units."
            }
            InvestCriterion::Small => "Split the story into smaller stories.",
            InvestCriterion::Testable => {
                "Add an acceptance test with Given, When and Then filled in."
            }
        }
    }
}

impl fmt::Display for InvestCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestClassification {
    Pass,
    Warn,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestMessage {
    pub code: String,
    pub criterion: InvestCriterion,
    pub severity: MessageSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestSummary {
    pub total: u8,
    pub passed: u8,
    pub failed: u8,
}

/// Result of scoring one story against INVEST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestAnalysis {
    pub story_id: String,
    pub independent: bool,
    pub negotiable: bool,
    pub valuable: bool,
    pub estimable: bool,
    pub small: bool,
    pub testable: bool,
    pub summary: InvestSummary,
    pub classification: InvestClassification,
    /// Depth beyond `max_depth`; reported regardless of the six criteria
    pub depth_warning: bool,
    pub ambiguity_flags: Vec<String>,
    pub messages: Vec<InvestMessage>,
    pub suggestions: Vec<String>,
}

impl InvestAnalysis {
    pub fn criterion(&self, criterion: InvestCriterion) -> bool {
        match criterion {
            InvestCriterion::Independent => self.independent,
            InvestCriterion::Negotiable => self.negotiable,
            InvestCriterion::Valuable => self.valuable,
            InvestCriterion::Estimable => self.estimable,
            InvestCriterion::Small => self.small,
            InvestCriterion::Testable => self.testable,
        }
    }

    pub fn failed_criteria(&self) -> Vec<InvestCriterion> {
        InvestCriterion::ALL
            .into_iter()
            .filter(|c| !self.criterion(*c))
            .collect()
    }
}

/// Score a story against the six INVEST heuristics
///
/// Criterion failures are data in the returned analysis, never errors.
///
/// # Errors
/// * `StoryNotFound` - unknown story
pub fn evaluate_invest(
    store: &Store,
    story_id: &str,
    options: &InvestOptions,
    lexicon: &Lexicon,
) -> Result<InvestAnalysis> {
    let start = Instant::now();
    log_op_start!("evaluate_invest", story_id = story_id);

    let result = analyse(store, story_id, options, lexicon);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(analysis) => log_op_end!(
            "evaluate_invest",
            duration_ms = duration_ms,
            invest_passed = analysis.summary.passed
        ),
        Err(err) => log_op_error!("evaluate_invest", err.clone(), duration_ms = duration_ms),
    }
    result
}

fn analyse(
    store: &Store,
    story_id: &str,
    options: &InvestOptions,
    lexicon: &Lexicon,
) -> Result<InvestAnalysis> {
    let story = store.get_story(story_id)?;
    let narrative = story.narrative();
    let intent = format!("{} {}", story.i_want, story.so_that);

    let ambiguity_flags = lexicon.detect_ambiguity(&narrative);
    let rigid = lexicon.detect_rigid_language(&narrative);

    let independent =
        !lexicon.has_dependency_language(&intent) && !references_sibling_story(store, story, &intent);
    let negotiable = ambiguity_flags.is_empty() && rigid.is_empty();
    let valuable = story.so_that.split_whitespace().count() > options.valuable_min_words;

    let estimate_ok = story
        .estimate_days
        .is_some_and(|days| days.is_finite() && days > 0.0);
    let estimable =
        estimate_ok && (ambiguity_flags.is_empty() || lexicon.has_measurable_quantity(&narrative));

    // An absent estimate is Estimable's concern, not Small's.
    let small = story.child_ids.len() <= options.small_children_threshold
        && !matches!(story.estimate_days, Some(days) if days > options.small_estimate_days);

    let testable = store
        .tests_of(story_id)?
        .iter()
        .any(|test| test.is_complete());

    let depth_warning = story.depth > options.max_depth;

    let verdicts = [
        (InvestCriterion::Independent, independent),
        (InvestCriterion::Negotiable, negotiable),
        (InvestCriterion::Valuable, valuable),
        (InvestCriterion::Estimable, estimable),
        (InvestCriterion::Small, small),
        (InvestCriterion::Testable, testable),
    ];
    let passed = verdicts.iter().filter(|(_, ok)| *ok).count() as u8;

    let classification = match (passed as usize == verdicts.len(), options.policy) {
        (true, _) => InvestClassification::Pass,
        (false, InvestPolicy::Warn) => InvestClassification::Warn,
        (false, InvestPolicy::Block) => InvestClassification::Block,
    };
    let severity = match options.policy {
        InvestPolicy::Warn => MessageSeverity::Warning,
        InvestPolicy::Block => MessageSeverity::Error,
    };

    let mut messages = Vec::new();
    let mut suggestions = Vec::new();
    for (criterion, ok) in verdicts {
        if ok {
            continue;
        }
        messages.push(InvestMessage {
            code: criterion.code(),
            criterion,
            severity,
            message: failure_message(criterion, story, options, &ambiguity_flags, &rigid),
        });
        suggestions.push(criterion.suggestion().to_string());
    }
    if depth_warning {
        suggestions.push(format!(
            "Story sits at depth {}; consider flattening below depth {}.",
            story.depth, options.max_depth
        ));
    }

    Ok(InvestAnalysis {
        story_id: story_id.to_string(),
        independent,
        negotiable,
        valuable,
        estimable,
        small,
        testable,
        summary: InvestSummary {
            total: verdicts.len() as u8,
            passed,
            failed: verdicts.len() as u8 - passed,
        },
        classification,
        depth_warning,
        ambiguity_flags,
        messages,
        suggestions,
    })
}

/// Another story of the same merge request is named by id in the text
fn references_sibling_story(store: &Store, story: &Story, text: &str) -> bool {
    store.list_stories().into_iter().any(|other| {
        other.id != story.id
            && other.mr_id == story.mr_id
            && other.id.len() >= MIN_REFERENCED_ID_LEN
            && text.contains(other.id.as_str())
    })
}

fn failure_message(
    criterion: InvestCriterion,
    story: &Story,
    options: &InvestOptions,
    ambiguity: &[String],
    rigid: &[String],
) -> String {
    match criterion {
        InvestCriterion::Independent => {
            "Story text depends on or references another story.".to_string()
        }
        InvestCriterion::Negotiable => {
            let terms: Vec<&str> = ambiguity.iter().chain(rigid).map(String::as_str).collect();
            format!("Narrative contains vague or prescriptive terms: {}.", terms.join(", "))
        }
        InvestCriterion::Valuable => format!(
            "'So that' needs more than {} words describing the benefit.",
            options.valuable_min_words
        ),
        InvestCriterion::Estimable => match story.estimate_days {
            Some(days) if days.is_finite() && days > 0.0 => {
                "Vague terms without a measurable quantity make the estimate unreliable."
                    .to_string()
            }
            _ => "Story has no positive estimate.".to_string(),
        },
        InvestCriterion::Small => format!(
            "Story has {} children (limit {}) or exceeds {} estimated days.",
            story.child_ids.len(),
            options.small_children_threshold,
            options.small_estimate_days
        ),
        InvestCriterion::Testable => {
            "No acceptance test with complete Given/When/Then.".to_string()
        }
    }
}
