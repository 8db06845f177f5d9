//! Manifest loading and split definitions.
//!
//! A manifest is a JSON document (usually `composer.json`) carrying the split
//! mapping under `extra.subtree-split`:
//!
//! ```json
//! {
//!   "extra": {
//!     "subtree-split": {
//!       "pkg-a": {
//!         "prefix": "packages/a",
//!         "target": "git@host:org/pkg-a.git",
//!         "branches": ["main"]
//!       }
//!     }
//!   }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SplitError};

/// Top-level key holding package metadata extensions.
const EXTRA_KEY: &str = "extra";

/// Key under `extra` holding the split mapping.
const MAPPING_KEY: &str = "subtree-split";

/// One subdirectory-to-remote split rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SplitDefinition {
    /// Directory prefix within the monorepo to extract.
    pub prefix: String,
    /// Remote repository the split history is pushed to.
    pub target: String,
    /// Branches to split, processed in this order.
    pub branches: Vec<String>,
}

/// Split definitions keyed by split name, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMapping {
    splits: Vec<(String, SplitDefinition)>,
}

impl SplitMapping {
    /// Loads the split mapping from a manifest file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SplitError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = content.len(), "Read manifest");

        Self::from_json(path, &content)
    }

    /// Parses the split mapping from manifest content.
    ///
    /// `path` is only used to label errors.
    pub fn from_json<P: AsRef<Path>>(path: P, content: &str) -> Result<Self> {
        let path = path.as_ref();

        let document: Value =
            serde_json::from_str(content).map_err(|source| SplitError::MalformedConfig {
                path: path.to_path_buf(),
                source,
            })?;

        let mapping = match document
            .get(EXTRA_KEY)
            .and_then(|extra| extra.get(MAPPING_KEY))
        {
            Some(Value::Object(mapping)) if !mapping.is_empty() => mapping,
            _ => {
                return Err(SplitError::MissingMapping {
                    path: path.to_path_buf(),
                })
            }
        };

        let mut splits = Vec::with_capacity(mapping.len());
        for (name, raw) in mapping {
            let definition = SplitDefinition::deserialize(raw).map_err(|e| {
                SplitError::InvalidDefinition {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;

            if definition.branches.is_empty() {
                warn!(split = %name, "Split definition lists no branches");
            }

            splits.push((name.clone(), definition));
        }

        Ok(Self { splits })
    }

    /// Iterates over `(name, definition)` pairs in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SplitDefinition)> {
        self.splits
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }

    /// Number of split definitions.
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    /// Whether the mapping has no split definitions.
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Total number of (split, branch) pipelines the mapping describes.
    pub fn pipeline_count(&self) -> usize {
        self.splits
            .iter()
            .map(|(_, definition)| definition.branches.len())
            .sum()
    }
}
