//! Rollup command
//!
//! Usage: storymap rollup (--mr <MR_ID> | --story <STORY_ID>)

use clap::Args;
use storymap_core::{build_rollup, RollupTarget};

use super::{print_json, CliResult, SourceArgs};

#[derive(Debug, Args)]
pub struct RollupArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Merge request whose roots to roll up
    #[arg(long, conflicts_with = "story", required_unless_present = "story")]
    pub mr: Option<String>,

    /// Single story subtree to roll up
    #[arg(long, conflicts_with = "mr")]
    pub story: Option<String>,
}

pub fn execute(args: RollupArgs) -> CliResult {
    let store = args.source.load_store()?;
    let target = match (args.mr, args.story) {
        (Some(mr_id), _) => RollupTarget::MergeRequest(mr_id),
        (None, Some(story_id)) => RollupTarget::Story(story_id),
        (None, None) => return Err("Must specify either --mr or --story".into()),
    };

    let rollups = build_rollup(&store, &target)?;
    print_json(&rollups)
}
