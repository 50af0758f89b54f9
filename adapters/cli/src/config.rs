//! Session manifest loading.
//!
//! The manifest is an optional TOML file; when it is absent every setting
//! falls back to its default, and a present file only needs the keys it
//! wants to override.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_TICK_INTERVAL_MS: u64 = 50;

/// Tunable session settings loaded from an optional TOML manifest.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct SessionManifest {
    tick_interval_ms: u64,
    autosave: bool,
}

impl Default for SessionManifest {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            autosave: true,
        }
    }
}

impl SessionManifest {
    /// Loads the manifest at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session manifest at {}", path.display()))?;
        toml::from_str(&contents).context("failed to parse session manifest toml contents")
    }

    /// Cadence of the tick source; never zero.
    pub(crate) fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Reports whether the session persists the snapshot after mutations.
    pub(crate) fn autosave(&self) -> bool {
        self.autosave
    }
}
