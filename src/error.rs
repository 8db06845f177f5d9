//! Error taxonomy for manifest loading and split execution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a manifest or running the split pipeline.
#[derive(Error, Debug)]
pub enum SplitError {
    /// The manifest file does not exist.
    #[error("Cannot find manifest file \"{}\"", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The manifest file is not valid JSON.
    #[error("{} is not a valid JSON file", .path.display())]
    MalformedConfig {
        /// Path of the offending manifest.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest has no usable `extra.subtree-split` object.
    #[error("Configuration file {} does not contain subtree split mapping", .path.display())]
    MissingMapping {
        /// Path of the offending manifest.
        path: PathBuf,
    },

    /// A split definition is missing a field or has a field of the wrong type.
    #[error("Invalid subtree split definition \"{name}\": {reason}")]
    InvalidDefinition {
        /// Split name as keyed in the manifest.
        name: String,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// An external process could not be started at all.
    #[error("Failed to start `{command}`")]
    Spawn {
        /// Command line that was attempted.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An external process exited with a non-zero status.
    ///
    /// A process terminated by a signal is reported with code `-1`.
    #[error("Unexpected return code {code} from `{command}`\n{stderr}")]
    Process {
        /// Command line that failed.
        command: String,
        /// Exit code of the process.
        code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// Reading the manifest or writing progress output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, SplitError>;
