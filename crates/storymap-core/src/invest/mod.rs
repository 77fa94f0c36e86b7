//! INVEST scoring: lexical heuristics and the six-criterion evaluator

pub mod evaluator;
pub mod lexicon;

pub use evaluator::{
    evaluate_invest, InvestAnalysis, InvestClassification, InvestCriterion, InvestMessage,
    InvestOptions, InvestPolicy, InvestSummary, MessageSeverity,
};
pub use lexicon::{Lexicon, LexiconConfig, MeasurabilityIssue, NumericAnalysis};
