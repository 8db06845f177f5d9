//! External process execution.
//!
//! [`ProcessRunner`] is the seam between the orchestrator and the operating
//! system: [`SystemRunner`] spawns real processes, [`DryRunRunner`] spawns
//! nothing. [`run_command`] layers the shared policy on top of any runner:
//! announce the command, surface its stderr, gate on the exit code, then
//! surface its stdout.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Result, SplitError};
use crate::output::Output;

/// Locale forced on every child so tool output is locale-invariant.
pub const LOCALE_ENV: (&str, &str) = ("LC_ALL", "C");

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program name or path.
    pub program: String,
    /// Arguments, passed verbatim.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Creates a command line from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `-1` if the process was terminated by a signal.
    pub code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs a command to completion and captures its output.
pub trait ProcessRunner {
    /// Executes `command` synchronously.
    ///
    /// Returns `Err` only when the process cannot be run at all; a non-zero
    /// exit is reported through [`ProcessOutput::code`].
    fn execute(&self, command: &CommandLine) -> Result<ProcessOutput>;
}

/// Spawns real processes, optionally inside a given working directory.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    work_dir: Option<PathBuf>,
}

impl SystemRunner {
    /// Creates a runner that uses the current working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner that runs every command inside `work_dir`.
    pub fn in_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(work_dir.into()),
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn execute(&self, command: &CommandLine) -> Result<ProcessOutput> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).env(LOCALE_ENV.0, LOCALE_ENV.1);
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| SplitError::Spawn {
            command: command.to_string(),
            source,
        })?;

        Ok(ProcessOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Reports success for every command without spawning anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl ProcessRunner for DryRunRunner {
    fn execute(&self, command: &CommandLine) -> Result<ProcessOutput> {
        debug!(command = %command, "Dry run, not executing");
        Ok(ProcessOutput::default())
    }
}

/// Runs `command` through `runner`, reporting progress to `output`.
///
/// A non-zero exit is an error unless `tolerate_failure` is set, in which case
/// it is logged and swallowed.
pub fn run_command<R, O>(
    runner: &R,
    output: &mut O,
    command: &CommandLine,
    tolerate_failure: bool,
) -> Result<()>
where
    R: ProcessRunner + ?Sized,
    O: Output + ?Sized,
{
    output.note(&format!("Running: {command}"))?;

    let result = runner.execute(command)?;
    debug!(command = %command, exit_code = result.code, "Process finished");

    let stderr = result.stderr.trim();
    if !stderr.is_empty() {
        output.note(stderr)?;
    }

    if !result.success() {
        if !tolerate_failure {
            return Err(SplitError::Process {
                command: command.to_string(),
                code: result.code,
                stderr: result.stderr,
            });
        }
        warn!(command = %command, exit_code = result.code, "Ignoring failed command");
    }

    if !result.stdout.is_empty() {
        output.text(&result.stdout)?;
    }

    Ok(())
}
