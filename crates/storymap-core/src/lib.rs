//! StoryMap Core - in-memory story hierarchy and INVEST rollup engine
//!
//! This crate provides:
//! - Merge request, story and acceptance test models
//! - A tree store with strict structural invariants (no cycles, contiguous
//!   sibling order, consistent depth, single merge request per tree)
//! - Bottom-up status rollups over story subtrees
//! - INVEST scoring driven by a data-only lexicon
//! - Outline and radial mindmap views
//! - Draft guidance for stories, acceptance tests and merge requests
//!
//! Mutations go through [`apply()`], which consumes the store and returns the
//! new state, the affected rollup roots and a fresh INVEST analysis.

pub mod apply;
pub mod commands;
pub mod config;
pub mod errors;
pub mod guidance;
pub mod invest;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod render;
pub mod rollup;
pub mod rules;

pub use storymap_core_types;

// Re-export commonly used types
pub use apply::{apply, Applied, ApplyOptions};
pub use commands::Command;
pub use config::StoryMapConfig;
pub use errors::{ExError, ExErrorKind, Result, StoryMapError};
pub use invest::{evaluate_invest, InvestAnalysis, InvestOptions, Lexicon};
pub use model::{AcceptanceTest, MergeRequest, Story, TestStatus, WorkflowStatus};
pub use ops::Store;
pub use rollup::{build_rollup, RollupResult, RollupTarget};
