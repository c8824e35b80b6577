//! Browser engine configuration.

use serde::{Deserialize, Serialize};

/// Browser engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false for debugging or if headless detection is an issue.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,

    /// Page load timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Extra seconds to wait when a Cloudflare interstitial is showing.
    #[serde(default = "default_challenge_wait")]
    pub challenge_wait: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

fn default_headless() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_challenge_wait() -> u64 {
    10
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            proxy: None,
            timeout: default_timeout(),
            challenge_wait: default_challenge_wait(),
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BrowserEngineConfig = toml::from_str("remote_url = \"ws://chrome:9222\"").unwrap();
        assert!(config.headless);
        assert_eq!(config.timeout, 30);
        assert_eq!(config.challenge_wait, 10);
        assert_eq!(config.remote_url.as_deref(), Some("ws://chrome:9222"));
    }
}
