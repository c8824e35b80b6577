//! Configuration management for aerofinder.
//!
//! Settings come from an optional TOML or JSON file, then environment
//! variables override individual keys. `.env` is loaded by the binary
//! before any of this runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::scrapers::BrowserEngineConfig;
use crate::services::change_detection::FirstSightPolicy;
use crate::services::scheduler::{clamp_interval, INTERVAL_BOUNDS_SECS};

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:aerofinder.db";

/// Carrier domains that only serve content after a JavaScript challenge.
pub const DEFAULT_BROWSER_DOMAINS: &[&str] = &["jinair.com", "parataair.com", "flyairseoul.com"];

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database URL or path. Set via DATABASE_URL.
    pub database_url: String,
    /// Seconds between scheduled cycles, clamped to 300..=600.
    pub crawl_interval_seconds: u64,
    /// Per-request timeout for the HTTP strategies.
    pub http_timeout_seconds: u64,
    /// Domains fetched through the browser only.
    pub browser_domains: Vec<String>,
    /// Impersonation profiles tried, in order, after a block.
    pub impersonate_profiles: Vec<String>,
    /// What single-page monitors do the first time they are crawled.
    pub first_sight: FirstSightPolicy,
    pub browser: BrowserEngineConfig,
    /// File the settings were loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            crawl_interval_seconds: *INTERVAL_BOUNDS_SECS.start(),
            http_timeout_seconds: 30,
            browser_domains: DEFAULT_BROWSER_DOMAINS.iter().map(|d| d.to_string()).collect(),
            impersonate_profiles: vec!["chrome".to_string(), "safari".to_string()],
            first_sight: FirstSightPolicy::default(),
            browser: BrowserEngineConfig::default(),
            source_path: None,
        }
    }
}

fn parse_seconds(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

impl Settings {
    /// Load settings from `path` (if any) and apply environment overrides.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::default(),
        };
        settings.with_env_overrides()
    }

    /// Load settings from a file. TOML for `.toml`, JSON otherwise.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut settings: Settings = match ext {
            "toml" => toml::from_str(&contents)?,
            _ => serde_json::from_str(&contents)?,
        };

        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply DATABASE_URL, CRAWL_INTERVAL_SECONDS and HTTP_TIMEOUT_SECONDS.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database_url = url;
        }
        if let Some(value) = lookup("CRAWL_INTERVAL_SECONDS") {
            self.crawl_interval_seconds = parse_seconds("CRAWL_INTERVAL_SECONDS", value)?;
        }
        if let Some(value) = lookup("HTTP_TIMEOUT_SECONDS") {
            self.http_timeout_seconds = parse_seconds("HTTP_TIMEOUT_SECONDS", value)?;
        }
        Ok(self)
    }

    /// The scheduler interval actually used.
    pub fn crawl_interval(&self) -> Duration {
        let interval = clamp_interval(self.crawl_interval_seconds);
        if interval.as_secs() != self.crawl_interval_seconds {
            warn!(
                "crawl_interval_seconds {} is outside {:?}, using {}",
                self.crawl_interval_seconds,
                INTERVAL_BOUNDS_SECS,
                interval.as_secs()
            );
        }
        interval
    }

    /// Database URL with `~` expanded and relative paths resolved against
    /// the config file's directory.
    pub fn resolved_database_url(&self) -> String {
        let raw = self.database_url.trim();
        let path = raw
            .strip_prefix("sqlite://")
            .or_else(|| raw.strip_prefix("sqlite:"))
            .unwrap_or(raw);

        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());
        let resolved = match self.source_path.as_ref().and_then(|p| p.parent()) {
            Some(base) if path.is_relative() && !base.as_os_str().is_empty() => base.join(path),
            _ => path.to_path_buf(),
        };

        format!("sqlite:{}", resolved.display())
    }
}
