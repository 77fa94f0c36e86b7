//! Draft guidance command
//!
//! Usage: storymap guide story --as-a <ROLE> --i-want <GOAL> --so-that <BENEFIT>
//!        storymap guide acceptance --title <T> --given <G> --when <W> --then <T>
//!        storymap guide merge-request --title <T> --summary <S>
//!
//! Exits non-zero when the report level is `fail`.

use clap::{Args, Subcommand};
use storymap_core::guidance::{
    evaluate_acceptance_draft, evaluate_merge_request_draft, evaluate_story_draft, AcceptanceDraft,
    GuidanceLevel, MergeRequestDraft, StoryDraft,
};

use super::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct GuideArgs {
    /// Engine configuration (TOML) supplying the lexicon
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: GuideCommand,
}

#[derive(Debug, Subcommand)]
pub enum GuideCommand {
    Story(StoryDraftArgs),
    Acceptance(AcceptanceDraftArgs),
    MergeRequest(MergeRequestDraftArgs),
}

#[derive(Debug, Args)]
pub struct StoryDraftArgs {
    #[arg(long, default_value = "")]
    pub as_a: String,
    #[arg(long, default_value = "")]
    pub i_want: String,
    #[arg(long, default_value = "")]
    pub so_that: String,
}

#[derive(Debug, Args)]
pub struct AcceptanceDraftArgs {
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub given: String,
    #[arg(long, default_value = "")]
    pub when: String,
    #[arg(long, default_value = "")]
    pub then: String,
}

#[derive(Debug, Args)]
pub struct MergeRequestDraftArgs {
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub summary: String,
}

pub fn execute(args: GuideArgs) -> CliResult {
    let config = match &args.config {
        Some(path) => storymap_core::config::load_config(path)?,
        None => storymap_core::StoryMapConfig::default(),
    };
    let lexicon = config.lexicon()?;

    let report = match args.command {
        GuideCommand::Story(draft) => evaluate_story_draft(
            &StoryDraft {
                as_a: draft.as_a,
                i_want: draft.i_want,
                so_that: draft.so_that,
            },
            &lexicon,
        ),
        GuideCommand::Acceptance(draft) => evaluate_acceptance_draft(
            &AcceptanceDraft {
                title: draft.title,
                given: draft.given,
                when: draft.when,
                then: draft.then,
            },
            &lexicon,
        ),
        GuideCommand::MergeRequest(draft) => evaluate_merge_request_draft(
            &MergeRequestDraft {
                title: draft.title,
                summary: draft.summary,
            },
            &lexicon,
        ),
    };

    print_json(&report)?;
    if report.level == GuidanceLevel::Fail {
        return Err(report.summary.into());
    }
    Ok(())
}
