//! CLI interface for monorepo-split.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod split;

pub use split::SplitCommand;

/// monorepo-split: Publishes monorepo subdirectories as standalone repositories.
#[derive(Parser)]
#[command(name = "monorepo-split")]
#[command(
    about = "Publishes monorepo subdirectories as standalone repositories",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Splits each configured prefix and force-pushes it to its target remote.
    Split(SplitCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Split(split_cmd) => split_cmd.execute(),
        }
    }
}
