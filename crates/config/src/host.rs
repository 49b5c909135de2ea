// Construction-time configuration supplied by the host

use crate::overrides::StaticOverrides;
use mps_core::{PlayerError, PresentationMode, Result, DEFAULT_POLL_INTERVAL};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Override scopes carried in the host configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverrideScopes {
    #[serde(default)]
    pub page: Option<StaticOverrides>,
    #[serde(default)]
    pub parent: Option<StaticOverrides>,
}

/// Host configuration. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// Audio source requested by the host
    #[serde(default)]
    pub src: Option<String>,
    /// Collapsible panel instead of the always-visible bar
    #[serde(default)]
    pub use_drawer: bool,
    /// Poll period override in milliseconds
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    /// Base URL serving `<code>.json` language files
    #[serde(default)]
    pub language_base_url: Option<String>,
    /// Directory holding `<code>.json` language files
    #[serde(default)]
    pub language_dir: Option<PathBuf>,
    /// Page and parent override scopes
    #[serde(default)]
    pub overrides: OverrideScopes,
    /// Also honor `MPS_PLAYER_SRC` / `MPS_PLAYER_LANG`, after the page and
    /// parent scopes. Off unless the host asks for it.
    #[serde(default)]
    pub env_overrides: bool,
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PlayerError::Config(format!("Invalid host config: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PlayerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    pub fn presentation(&self) -> PresentationMode {
        PresentationMode::from_use_drawer(self.use_drawer)
    }

    /// Poll period; zero is treated as unset
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}
