//! Snapshot commands
//!
//! Usage: storymap snapshot validate [--snapshot <FILE>]
//!        storymap snapshot digest [--snapshot <FILE>]

use clap::{Args, Subcommand};
use storymap_core::rules::validate_tree;
use storymap_store::snapshot::{compute_snapshot_digest, import_snapshot, parse_snapshot_file};

use super::{CliResult, SourceArgs};

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Import the snapshot and check every tree invariant
    Validate(SourceArgs),
    /// Print the SHA-256 digest of the snapshot content
    Digest(SourceArgs),
}

pub fn execute(args: SnapshotArgs) -> CliResult {
    match args.command {
        SnapshotCommand::Validate(source) => execute_validate(source),
        SnapshotCommand::Digest(source) => execute_digest(source),
    }
}

fn execute_validate(source: SourceArgs) -> CliResult {
    let store = source.load_store()?;
    validate_tree(&store)?;
    println!(
        "OK: {} merge requests, {} stories, {} tests",
        store.list_merge_requests().len(),
        store.story_count(),
        store.test_count()
    );
    Ok(())
}

fn execute_digest(source: SourceArgs) -> CliResult {
    let snapshot = parse_snapshot_file(&source.snapshot)?;
    // Digest only content that imports cleanly
    import_snapshot(&snapshot)?;
    println!("{}", compute_snapshot_digest(&snapshot)?);
    Ok(())
}
