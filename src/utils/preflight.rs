//! Preflight validation checks for early failure detection.
//!
//! Splitting mutates the local repository's remotes and refs, so commands
//! check they are running inside a repository before spawning anything.

use std::path::Path;

use anyhow::{Context, Result};
use git2::Repository;
use tracing::debug;

/// Validates that `path` is inside a git repository.
pub fn check_git_repository<P: AsRef<Path>>(path: P) -> Result<()> {
    let repo = Repository::discover(path.as_ref()).context(
        "Not in a git repository. Please run this command from within a git repository.",
    )?;
    debug!(git_dir = %repo.path().display(), "Found git repository");
    Ok(())
}
