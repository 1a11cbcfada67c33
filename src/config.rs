//! Configuration file parser.
//!
//! The config file is optional: a missing file yields `Config::default()`,
//! which reproduces the built-in source URL and fallback chain. Unknown keys
//! are ignored by serde, though we log a warning when the file contains
//! potential typos.
use crate::feed::{CandidateTemplate, FetchPolicy};
use crate::feed::fetcher::{DEFAULT_MAX_DIAGNOSTICS, DEFAULT_SOURCE_LABEL};
use crate::util::UrlValidationError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SOURCE_URL: &str = "https://www.kyberturvallisuuskeskus.fi/feed/rss/fi";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; NCSC-FI-CacheBot/1.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Candidate '{name}' does not render to a usable URL: {source}")]
    InvalidCandidate {
        name: String,
        #[source]
        source: UrlValidationError,
    },

    #[error("No candidate URLs configured")]
    NoCandidates,

    #[error("Server path must start with '/': {0}")]
    InvalidServerPath(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// A `[[candidates]]` list in the file replaces the default chain entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The feed every candidate ultimately fetches.
    pub source_url: String,

    /// Value of the envelope's `source` field.
    pub source_label: String,

    pub user_agent: String,

    /// Per-request deadline in seconds.
    pub request_timeout_secs: u64,

    /// Cap on per-candidate diagnostics in a failure envelope.
    pub max_attempt_diagnostics: usize,

    /// Where `fetch` writes the envelope.
    pub output_path: PathBuf,

    /// Ordered fallback chain.
    pub candidates: Vec<CandidateTemplate>,

    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            source_label: DEFAULT_SOURCE_LABEL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 20,
            max_attempt_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            output_path: PathBuf::from("ncsc-rss.json"),
            candidates: CandidateTemplate::default_chain(),
            server: ServerConfig::default(),
        }
    }
}

/// Settings for `feedrelay serve`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Route answering GET/OPTIONS with the envelope.
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            path: "/api/feed".to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "source_url",
        "source_label",
        "user_agent",
        "request_timeout_secs",
        "max_attempt_diagnostics",
        "output_path",
        "candidates",
        "server",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    /// - Candidates that do not render to http(s) URLs → `Err(ConfigError::InvalidCandidate)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid loading a runaway file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.fetch_policy()?;
        if !config.server.path.starts_with('/') {
            return Err(ConfigError::InvalidServerPath(config.server.path));
        }
        tracing::info!(
            path = %path.display(),
            candidates = config.candidates.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Renders every candidate against `source_url` and assembles the policy.
    pub fn fetch_policy(&self) -> Result<FetchPolicy, ConfigError> {
        if self.candidates.is_empty() {
            return Err(ConfigError::NoCandidates);
        }

        let candidates = self
            .candidates
            .iter()
            .map(|t| {
                t.render(&self.source_url)
                    .map_err(|source| ConfigError::InvalidCandidate {
                        name: t.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut policy = FetchPolicy::new(candidates);
        policy.user_agent = self.user_agent.clone();
        policy.request_timeout = Duration::from_secs(self.request_timeout_secs);
        policy.source_label = self.source_label.clone();
        policy.max_diagnostics = self.max_attempt_diagnostics;
        Ok(policy)
    }
}

// ============================================================================
// Tests
// ============================================================================
