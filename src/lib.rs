//! # monorepo-split
//!
//! Publishes subdirectories of a monorepo as standalone repositories.
//!
//! A JSON manifest maps split names to a directory prefix, a target remote and
//! a list of branches. For every branch the history touching the prefix is
//! extracted with `splitsh-lite` and force-pushed to the target.
//!
//! ## Quick Start
//!
//! ```rust
//! use monorepo_split::manifest::SplitMapping;
//! use monorepo_split::output::MemoryOutput;
//! use monorepo_split::process::DryRunRunner;
//! use monorepo_split::splitter::{Splitter, Toolchain};
//!
//! let mapping = SplitMapping::from_json(
//!     "composer.json",
//!     r#"{"extra":{"subtree-split":{"pkg-a":{
//!         "prefix":"packages/a","target":"git@host:org/pkg-a.git","branches":["main"]
//!     }}}}"#,
//! )?;
//!
//! let mut splitter = Splitter::new(DryRunRunner, MemoryOutput::new(), Toolchain::default());
//! assert_eq!(splitter.split_all(&mapping)?, 1);
//! # Ok::<(), monorepo_split::SplitError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod error;
pub mod manifest;
pub mod output;
pub mod process;
pub mod splitter;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::error::SplitError;

/// The current version of monorepo-split.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
