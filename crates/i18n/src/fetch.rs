// Language resource sources

use mps_core::{PlayerError, Result};
use std::path::PathBuf;
use std::time::Duration;

const EN_JSON: &str = include_str!("../lang/en.json");
const FR_CA_JSON: &str = include_str!("../lang/fr-ca.json");

/// Somewhere a `<code>.json` resource can be read from
pub trait LanguageSource: Send + Sync {
    /// Fetch the raw resource body for `code`
    fn fetch(&self, code: &str) -> Result<String>;

    /// Description used in logs
    fn describe(&self) -> String;
}

/// Create a configured HTTP agent for resource fetches
pub fn create_http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(30))
        .timeout_read(Duration::from_secs(60))
        .user_agent("Mozilla/5.0 (compatible; MpsAudioPlayer/0.1)")
        .redirects(10)
        .build()
}

/// Fetches `<base_url>/<code>.json` over HTTP. One attempt, no retry.
pub struct HttpLanguageSource {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpLanguageSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            agent: create_http_agent(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, code: &str) -> String {
        format!("{}/{}.json", self.base_url.trim_end_matches('/'), code)
    }
}

impl LanguageSource for HttpLanguageSource {
    fn fetch(&self, code: &str) -> Result<String> {
        let url = self.url_for(code);
        log::debug!("GET {}", url);
        let response = self.agent.get(&url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => {
                PlayerError::Network(format!("HTTP {} for {}", status, url))
            }
            other => PlayerError::Network(format!("HTTP GET failed: {}", other)),
        })?;
        response
            .into_string()
            .map_err(|e| PlayerError::Network(format!("Failed to read body of {}: {}", url, e)))
    }

    fn describe(&self) -> String {
        format!("http {}", self.base_url)
    }
}

/// Reads `<dir>/<code>.json` from disk
#[derive(Debug, Clone)]
pub struct DirLanguageSource {
    dir: PathBuf,
}

impl DirLanguageSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LanguageSource for DirLanguageSource {
    fn fetch(&self, code: &str) -> Result<String> {
        let path = self.dir.join(format!("{}.json", code));
        std::fs::read_to_string(&path)
            .map_err(|e| PlayerError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn describe(&self) -> String {
        format!("dir {}", self.dir.display())
    }
}

/// Resources compiled into the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLanguageSource;

impl LanguageSource for EmbeddedLanguageSource {
    fn fetch(&self, code: &str) -> Result<String> {
        match code {
            "en" => Ok(EN_JSON.to_string()),
            "fr-ca" => Ok(FR_CA_JSON.to_string()),
            other => Err(PlayerError::Io(format!("No bundled resource for '{}'", other))),
        }
    }

    fn describe(&self) -> String {
        "embedded".to_string()
    }
}
