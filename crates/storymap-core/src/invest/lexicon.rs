//! Keyword and pattern heuristics over story text
//!
//! The word lists and patterns are data (`LexiconConfig`, loadable from the
//! `[lexicon]` table of the config file); `Lexicon` is the compiled form.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StoryMapError};

/// Numbers followed by a unit: `5 days`, `200ms`, `10%`, `3 users`
pub const DEFAULT_NUMERIC_WITH_UNIT: &str = r"(?i)\b\d+(?:\.\d+)?\s*(?:%|percent\b|(?:ms|milliseconds?|s|secs?|seconds?|mins?|minutes?|h|hrs?|hours?|days?|weeks?|kb|mb|gb|px|users?|reqs?|requests?|items?|rps|qps)\b)";

/// `story 12`, `story #4`, `US-3`
pub const DEFAULT_STORY_REFERENCE: &str = r"(?i)\b(?:story|us)[\s#-]*\d+\b";

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is a valid regex"))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Serializable lexicon data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Vague terms keyed by locale
    pub ambiguity: BTreeMap<String, Vec<String>>,
    /// Wording that fixes the solution instead of leaving it open
    pub rigid_terms: Vec<String>,
    pub dependency_phrases: Vec<String>,
    pub story_reference_pattern: String,
    pub numeric_with_unit_pattern: String,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        let mut ambiguity = BTreeMap::new();
        ambiguity.insert(
            "en".to_string(),
            strings(&[
                "should",
                "maybe",
                "asap",
                "etc",
                "optimal",
                "fast",
                "sufficiently",
                "quickly",
                "soon",
                "approximately",
            ]),
        );
        ambiguity.insert(
            "ko".to_string(),
            strings(&[
                "적절히",
                "빠르게",
                "최적",
                "가능하면",
                "추후",
                "등등",
                "대략",
                "어느정도",
                "최대한",
            ]),
        );

        Self {
            ambiguity,
            rigid_terms: strings(&["must", "exact", "exactly", "perfect", "perfectly"]),
            dependency_phrases: strings(&[
                "depends on",
                "dependent on",
                "after story",
                "blocked by",
                "requires story",
                "once story",
                "prerequisite",
            ]),
            story_reference_pattern: DEFAULT_STORY_REFERENCE.to_string(),
            numeric_with_unit_pattern: DEFAULT_NUMERIC_WITH_UNIT.to_string(),
        }
    }
}

/// A Given/When/Then step that lacks a measurable quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasurabilityIssue {
    pub step_index: usize,
    pub text: String,
    pub reason: String,
}

/// Numbers found in a text, split by whether a unit follows them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NumericAnalysis {
    pub with_unit: Vec<String>,
    pub without_unit: Vec<String>,
}

impl NumericAnalysis {
    /// Digits are present but none carries a unit
    pub fn missing_measurement(&self) -> bool {
        self.with_unit.is_empty() && !self.without_unit.is_empty()
    }
}

/// Compiled lexicon
#[derive(Debug, Clone)]
pub struct Lexicon {
    ambiguity: BTreeMap<String, Vec<String>>,
    rigid_terms: Vec<String>,
    dependency_phrases: Vec<String>,
    story_reference: Regex,
    numeric_with_unit: Regex,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::from_config(&LexiconConfig::default())
            .expect("built-in lexicon patterns are valid regexes")
    }
}

impl Lexicon {
    /// # Errors
    ///
    /// Returns `Validation` if either pattern fails to compile.
    pub fn from_config(config: &LexiconConfig) -> Result<Self> {
        let compile = |field: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| StoryMapError::validation(field, e.to_string()))
        };

        Ok(Self {
            ambiguity: config
                .ambiguity
                .iter()
                .map(|(locale, terms)| (locale.clone(), lowercase_all(terms)))
                .collect(),
            rigid_terms: lowercase_all(&config.rigid_terms),
            dependency_phrases: lowercase_all(&config.dependency_phrases),
            story_reference: compile(
                "lexicon.story_reference_pattern",
                &config.story_reference_pattern,
            )?,
            numeric_with_unit: compile(
                "lexicon.numeric_with_unit_pattern",
                &config.numeric_with_unit_pattern,
            )?,
        })
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.ambiguity.keys().map(String::as_str)
    }

    /// Ambiguity terms present in `text`, across all locales, deduplicated
    pub fn detect_ambiguity(&self, text: &str) -> Vec<String> {
        let normalized = Normalized::new(text);
        let mut found: Vec<String> = Vec::new();
        for term in self.ambiguity.values().flatten() {
            if normalized.contains_term(term) && !found.contains(term) {
                found.push(term.clone());
            }
        }
        found
    }

    /// Ambiguity terms of one locale present in `text`
    pub fn detect_ambiguity_in(&self, locale: &str, text: &str) -> Vec<String> {
        let normalized = Normalized::new(text);
        self.ambiguity
            .get(locale)
            .map(|terms| {
                terms
                    .iter()
                    .filter(|term| normalized.contains_term(term))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn detect_rigid_language(&self, text: &str) -> Vec<String> {
        let normalized = Normalized::new(text);
        self.rigid_terms
            .iter()
            .filter(|term| normalized.contains_term(term))
            .cloned()
            .collect()
    }

    /// Dependency phrases and story references present in `text`
    pub fn dependency_hits(&self, text: &str) -> Vec<String> {
        let normalized = Normalized::new(text);
        let mut hits: Vec<String> = self
            .dependency_phrases
            .iter()
            .filter(|phrase| normalized.contains_term(phrase))
            .cloned()
            .collect();
        hits.extend(
            self.story_reference
                .find_iter(text)
                .map(|m| m.as_str().to_string()),
        );
        hits
    }

    pub fn has_dependency_language(&self, text: &str) -> bool {
        !self.dependency_hits(text).is_empty()
    }

    pub fn has_measurable_quantity(&self, text: &str) -> bool {
        self.numeric_with_unit.is_match(text)
    }

    /// Check every step for a number-with-unit
    pub fn require_measurable(&self, steps: &[&str]) -> Vec<MeasurabilityIssue> {
        steps
            .iter()
            .enumerate()
            .filter_map(|(step_index, step)| {
                let reason = if step.trim().is_empty() {
                    "step is empty"
                } else if self.has_measurable_quantity(step) {
                    return None;
                } else if number_regex().is_match(step) {
                    "number has no unit"
                } else {
                    "no measurable quantity"
                };
                Some(MeasurabilityIssue {
                    step_index,
                    text: step.to_string(),
                    reason: reason.to_string(),
                })
            })
            .collect()
    }

    pub fn analyse_numeric_units(&self, text: &str) -> NumericAnalysis {
        let unit_spans: Vec<(usize, usize)> = self
            .numeric_with_unit
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut analysis = NumericAnalysis::default();
        for number in number_regex().find_iter(text) {
            let covered = unit_spans
                .iter()
                .any(|(start, end)| number.start() >= *start && number.end() <= *end);
            if covered {
                analysis.with_unit.push(number.as_str().to_string());
            } else {
                analysis.without_unit.push(number.as_str().to_string());
            }
        }
        analysis
    }
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.trim().to_lowercase()).collect()
}

/// Lowercased text with sentence punctuation blanked, plus its word tokens
struct Normalized {
    text: String,
    tokens: Vec<String>,
}

impl Normalized {
    fn new(text: &str) -> Self {
        let text: String = text
            .to_lowercase()
            .chars()
            .map(|c| match c {
                '.' | ',' | ';' | ':' | '!' | '?' | '(' | ')' | '"' => ' ',
                other => other,
            })
            .collect();
        let tokens = text.split_whitespace().map(str::to_string).collect();
        Self { text, tokens }
    }

    /// ASCII terms match whole words; other scripts (where particles attach
    /// to the stem) match as substrings.
    fn contains_term(&self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        if !term.is_ascii() {
            return self.text.contains(term);
        }
        let words: Vec<&str> = term.split_whitespace().collect();
        self.tokens
            .windows(words.len())
            .any(|window| window.iter().zip(&words).all(|(token, word)| token == word))
    }
}
