//! Settings and configuration utilities.
//!
//! Settings are read from `$HOME/.monorepo-split/settings.json` and act as a
//! fallback for environment variables:
//!
//! ```json
//! { "env": { "MONOREPO_SPLIT_SPLITTER": "/opt/splitsh/splitsh-lite" } }
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::splitter::{Toolchain, DEFAULT_GIT, DEFAULT_SPLITTER};

/// Environment variable overriding the history-splitting tool.
pub const SPLITTER_ENV: &str = "MONOREPO_SPLIT_SPLITTER";

/// Environment variable overriding the git client.
pub const GIT_ENV: &str = "MONOREPO_SPLIT_GIT";

/// Settings loaded from `$HOME/.monorepo-split/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    ///
    /// Without a resolvable home directory there is nothing to read, so the
    /// defaults are used.
    pub fn load() -> Result<Self> {
        Self::load_from_home(dirs::home_dir())
    }

    /// Loads settings relative to `home`, falling back to defaults when it is `None`.
    pub fn load_from_home(home: Option<PathBuf>) -> Result<Self> {
        match home {
            Some(home_dir) => Self::load_from_path(Self::settings_path_in(&home_dir)),
            None => {
                warn!("Cannot determine home directory, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // A missing file just means nothing is overridden
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(Self::settings_path_in(&home_dir))
    }

    fn settings_path_in(home_dir: &Path) -> PathBuf {
        home_dir.join(".monorepo-split").join("settings.json")
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }

    /// Resolves the external tools, letting `splitter_override` win over
    /// environment and settings.
    pub fn toolchain(&self, splitter_override: Option<&str>) -> Toolchain {
        let splitter = splitter_override
            .map(String::from)
            .or_else(|| self.get_env_var(SPLITTER_ENV))
            .unwrap_or_else(|| DEFAULT_SPLITTER.to_string());

        let git = self
            .get_env_var(GIT_ENV)
            .unwrap_or_else(|| DEFAULT_GIT.to_string());

        Toolchain { splitter, git }
    }
}
