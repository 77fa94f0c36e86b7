//! INVEST command
//!
//! Usage: storymap invest <STORY_ID> [--config <FILE>]

use clap::Args;
use storymap_core::evaluate_invest;

use super::{print_json, CliResult, SourceArgs};

#[derive(Debug, Args)]
pub struct InvestArgs {
    /// Story to analyse
    pub story_id: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn execute(args: InvestArgs) -> CliResult {
    let store = args.source.load_store()?;
    let options = args.source.apply_options()?;

    let analysis = evaluate_invest(&store, &args.story_id, &options.invest, &options.lexicon)?;
    print_json(&analysis)
}
