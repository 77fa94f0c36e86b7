//! Render command
//!
//! Usage: storymap render outline <MR_ID> [--output <FILE>]
//!        storymap render mindmap <MR_ID> [--collapse <STORY_ID>]...

use std::path::PathBuf;

use clap::{Args, Subcommand};
use storymap_core::render::{build_mindmap, render_outline, CollapseState};

use super::{CliResult, SourceArgs};

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(subcommand)]
    pub command: RenderCommand,
}

#[derive(Debug, Subcommand)]
pub enum RenderCommand {
    /// Indented Markdown outline
    Outline(RenderOutlineArgs),
    /// Radial mindmap layout as JSON
    Mindmap(RenderMindmapArgs),
}

#[derive(Debug, Args)]
pub struct RenderOutlineArgs {
    /// Merge request to render
    pub mr_id: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RenderMindmapArgs {
    /// Merge request to render
    pub mr_id: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Hide the children of this story (repeatable)
    #[arg(long)]
    pub collapse: Vec<String>,

    /// Hide the acceptance tests of this story (repeatable)
    #[arg(long)]
    pub collapse_tests: Vec<String>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: RenderArgs) -> CliResult {
    match args.command {
        RenderCommand::Outline(outline_args) => execute_outline(outline_args),
        RenderCommand::Mindmap(mindmap_args) => execute_mindmap(mindmap_args),
    }
}

fn execute_outline(args: RenderOutlineArgs) -> CliResult {
    let store = args.source.load_store()?;
    let markdown = render_outline(&store, &args.mr_id)?;
    write_output(args.output, &markdown)
}

fn execute_mindmap(args: RenderMindmapArgs) -> CliResult {
    let store = args.source.load_store()?;
    let collapse = CollapseState {
        story_children: args.collapse.into_iter().collect(),
        acceptance_tests: args.collapse_tests.into_iter().collect(),
    };
    let mindmap = build_mindmap(&store, &args.mr_id, &collapse)?;
    let json = serde_json::to_string_pretty(&mindmap)?;
    write_output(args.output, &format!("{}\n", json))
}

fn write_output(output: Option<PathBuf>, content: &str) -> CliResult {
    match output {
        Some(path) => {
            std::fs::write(&path, content)?;
            eprintln!("Rendered to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
