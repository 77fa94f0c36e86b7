//! Story mutation commands
//!
//! Each command loads the snapshot, applies one command and writes the new
//! state back (or to `--out`). The JSON printed on stdout names the stale
//! rollup roots and carries the fresh INVEST analysis when there is one.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use storymap_core::ops::StoryPatch;
use storymap_core::{apply, Applied, Command, InvestAnalysis, WorkflowStatus};
use storymap_store::save_snapshot;

use super::{print_json, CliResult, SourceArgs};

#[derive(Debug, Args)]
pub struct StoryArgs {
    #[command(subcommand)]
    pub command: StoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum StoryCommand {
    /// Move a story under a new parent (or to the root level)
    Move(MoveArgs),
    /// Delete a story with its subtree and tests
    Delete(DeleteArgs),
    /// Set a story's workflow status
    Status(StatusArgs),
}

#[derive(Debug, Args)]
pub struct WriteArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the result here instead of overwriting the snapshot
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub story_id: String,

    /// New parent story; omit to move to the root level
    #[arg(long)]
    pub parent: Option<String>,

    /// Position among the new siblings; clamped to the end
    #[arg(long, default_value_t = usize::MAX)]
    pub index: usize,

    #[command(flatten)]
    pub write: WriteArgs,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub story_id: String,

    #[command(flatten)]
    pub write: WriteArgs,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    pub story_id: String,

    /// draft, in_progress, review, done or blocked
    pub status: WorkflowStatus,

    #[command(flatten)]
    pub write: WriteArgs,
}

#[derive(Debug, Serialize)]
struct MutationReport<'a> {
    op: &'static str,
    entity_id: Option<&'a str>,
    affected_roots: &'a [String],
    invest: Option<&'a InvestAnalysis>,
}

pub fn execute(args: StoryArgs) -> CliResult {
    let (write, cmd) = match args.command {
        StoryCommand::Move(a) => (
            a.write,
            Command::StoryMove {
                story_id: a.story_id,
                new_parent_id: a.parent,
                new_index: a.index,
            },
        ),
        StoryCommand::Delete(a) => (
            a.write,
            Command::StoryDelete {
                story_id: a.story_id,
            },
        ),
        StoryCommand::Status(a) => (
            a.write,
            Command::StoryUpdate {
                story_id: a.story_id,
                patch: StoryPatch {
                    status: Some(a.status),
                    ..Default::default()
                },
            },
        ),
    };

    let store = write.source.load_store()?;
    let options = write.source.apply_options()?;
    let op = cmd.op_name();
    let applied: Applied = apply(store, cmd, &options)?;

    let target = write.out.as_ref().unwrap_or(&write.source.snapshot);
    save_snapshot(target, &applied.store)?;

    print_json(&MutationReport {
        op,
        entity_id: applied.entity_id.as_deref(),
        affected_roots: &applied.affected_roots,
        invest: applied.invest.as_ref(),
    })
}
