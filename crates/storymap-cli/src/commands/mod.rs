pub mod guide;
pub mod invest;
pub mod render;
pub mod rollup;
pub mod snapshot;
pub mod story;

use std::path::PathBuf;

use clap::Args;
use storymap_core::config::load_config;
use storymap_core::{ApplyOptions, StoryMapConfig, Store};
use storymap_store::load_snapshot;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Where the story map and its configuration come from
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Snapshot file to read
    #[arg(long, default_value = "storymap.yaml")]
    pub snapshot: PathBuf,

    /// Engine configuration (TOML); built-in defaults when absent
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    pub fn load_store(&self) -> Result<Store, Box<dyn std::error::Error>> {
        Ok(load_snapshot(&self.snapshot)?)
    }

    pub fn load_config(&self) -> Result<StoryMapConfig, Box<dyn std::error::Error>> {
        match &self.config {
            Some(path) => Ok(load_config(path)?),
            None => Ok(StoryMapConfig::default()),
        }
    }

    pub fn apply_options(&self) -> Result<ApplyOptions, Box<dyn std::error::Error>> {
        Ok(ApplyOptions::from_config(&self.load_config()?)?)
    }
}

/// Pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
