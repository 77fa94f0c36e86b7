//! StoryMap CLI
//!
//! Command-line interface over a YAML story map snapshot

use std::error::Error;

use clap::{Parser, Subcommand};
use storymap_core::logging_facility::{init, Profile};
use storymap_core::storymap_core_types::RequestId;
use storymap_core::{ExError, StoryMapError};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "storymap")]
#[command(about = "StoryMap - story hierarchy, rollups and INVEST scoring", long_about = None)]
struct Cli {
    /// Log operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines (implies --verbose)
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Status rollup for a merge request or a story subtree
    Rollup(commands::rollup::RollupArgs),
    /// INVEST analysis of one story
    Invest(commands::invest::InvestArgs),
    /// Draft guidance for stories, acceptance tests and merge requests
    Guide(commands::guide::GuideArgs),
    /// Render a merge request as an outline or a mindmap
    Render(commands::render::RenderArgs),
    /// Story mutations (move, delete, status)
    Story(commands::story::StoryArgs),
    /// Snapshot checks (validate, digest)
    Snapshot(commands::snapshot::SnapshotArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.log_json {
        init(Profile::Production);
    } else if cli.verbose {
        init(Profile::Development);
    }

    let result = match cli.command {
        Commands::Rollup(args) => commands::rollup::execute(args),
        Commands::Invest(args) => commands::invest::execute(args),
        Commands::Guide(args) => commands::guide::execute(args),
        Commands::Render(args) => commands::render::execute(args),
        Commands::Story(args) => commands::story::execute(args),
        Commands::Snapshot(args) => commands::snapshot::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", report(e.as_ref(), RequestId::new()));
        std::process::exit(1);
    }
}

/// Tag core and store errors with the invocation's request id
fn report(err: &(dyn Error + 'static), request_id: RequestId) -> String {
    let ex_err = if let Some(ex_err) = err.downcast_ref::<ExError>() {
        ex_err.clone()
    } else if let Some(domain) = err.downcast_ref::<StoryMapError>() {
        ExError::from(domain.clone())
    } else {
        return err.to_string();
    };
    ex_err.with_request_id(request_id).to_string()
}
