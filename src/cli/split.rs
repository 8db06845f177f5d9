//! Split command — publishes each configured prefix to its target remote.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use crate::manifest::SplitMapping;
use crate::output::ConsoleOutput;
use crate::process::{DryRunRunner, ProcessRunner, SystemRunner};
use crate::splitter::{Splitter, Toolchain};
use crate::utils::{check_git_repository, Settings};

/// Split command options.
#[derive(Parser)]
pub struct SplitCommand {
    /// JSON manifest containing the `extra.subtree-split` mapping.
    #[arg(value_name = "FILE", default_value = "composer.json")]
    pub file: PathBuf,

    /// Prints the commands that would run without executing them.
    #[arg(long)]
    pub dry_run: bool,

    /// History-splitting tool to invoke (defaults to `splitsh-lite`).
    #[arg(long, value_name = "PATH")]
    pub splitter: Option<String>,
}

impl SplitCommand {
    /// Executes the split command in the current directory.
    pub fn execute(self) -> Result<()> {
        self.execute_in(Path::new("."))
    }

    /// Executes the split command against the repository at `work_dir`.
    ///
    /// The manifest is loaded before anything else, so manifest errors are
    /// reported even outside a repository and no process is spawned for them.
    pub fn execute_in(self, work_dir: &Path) -> Result<()> {
        let mapping = SplitMapping::load_from_file(&self.file)
            .with_context(|| format!("Failed to load manifest {}", self.file.display()))?;
        debug!(
            splits = mapping.len(),
            pipelines = mapping.pipeline_count(),
            "Loaded split mapping"
        );

        let settings = Settings::load()?;
        let tools = settings.toolchain(self.splitter.as_deref());
        debug!(splitter = %tools.splitter, git = %tools.git, "Resolved toolchain");

        if self.dry_run {
            run(DryRunRunner, tools, &mapping)
        } else {
            check_git_repository(work_dir)?;
            run(SystemRunner::in_dir(work_dir), tools, &mapping)
        }
    }
}

fn run<R: ProcessRunner>(runner: R, tools: Toolchain, mapping: &SplitMapping) -> Result<()> {
    let mut splitter = Splitter::new(runner, ConsoleOutput::default(), tools);
    splitter.split_all(mapping).context("Split failed")?;
    Ok(())
}
