//! Fetch gateway: resolve a URL to page text through an ordered chain of
//! capability-tagged strategies.
//!
//! Failures never escape the gateway. Every error degrades to `None`,
//! which callers treat as "skip this URL this cycle".

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use super::browser::BrowserStrategy;
use super::http_client::{resolve_profiles, HttpClient};
use crate::config::Settings;

/// Result of one strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page body.
    Content(String),
    /// The server refused us (bot blocking); worth another strategy.
    Blocked(u16),
    /// Any other failure; not retried.
    Failed,
}

/// What a strategy is capable of, which decides when the gateway uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Plain HTTP with browser-like headers.
    Direct,
    /// HTTP posing as a specific browser, used after a block.
    Impersonate,
    /// Full browser automation for hostile domains.
    Browser,
}

/// One way of retrieving a page.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> StrategyKind;
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Anything that can turn a URL into page text.
///
/// Implemented by [`FetchGateway`]; the crawler and pipeline only depend
/// on this trait.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}

/// The production fetcher.
pub struct FetchGateway {
    strategies: Vec<Box<dyn FetchStrategy>>,
    browser_domains: Vec<String>,
}

impl FetchGateway {
    /// Create an empty gateway routing `browser_domains` to browser strategies.
    pub fn new<S: Into<String>>(browser_domains: impl IntoIterator<Item = S>) -> Self {
        Self {
            strategies: Vec::new(),
            browser_domains: browser_domains
                .into_iter()
                .map(|d| d.into().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// Append a strategy. Order within a kind is the order of attempts.
    pub fn with_strategy(mut self, strategy: impl FetchStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Build the standard chain: direct, one impersonation client per
    /// configured profile, then the browser.
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(settings.http_timeout_seconds);
        let mut gateway =
            Self::new(settings.browser_domains.iter().cloned()).with_strategy(HttpClient::direct(timeout)?);

        for profile in resolve_profiles(&settings.impersonate_profiles) {
            gateway = gateway.with_strategy(HttpClient::impersonating(profile, timeout)?);
        }

        Ok(gateway.with_strategy(BrowserStrategy::new(settings.browser.clone())))
    }

    /// Names of the configured strategies, in order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Whether `url` belongs to a domain that must go through the browser.
    pub fn requires_browser(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        else {
            return false;
        };

        self.browser_domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    }

    fn strategies_of(&self, kind: StrategyKind) -> impl Iterator<Item = &dyn FetchStrategy> {
        self.strategies
            .iter()
            .map(|s| &**s)
            .filter(move |s| s.kind() == kind)
    }

    /// Fetch a page, returning `None` on any failure.
    pub async fn fetch_page(&self, url: &str) -> Option<String> {
        if self.requires_browser(url) {
            debug!("{} is on a browser-only domain", url);
            for strategy in self.strategies_of(StrategyKind::Browser) {
                if let Some(content) = accept(strategy, url, strategy.fetch(url).await) {
                    return Some(content);
                }
            }
            warn!("All browser strategies failed for {}", url);
            return None;
        }

        let mut blocked = false;
        for strategy in self.strategies_of(StrategyKind::Direct) {
            match strategy.fetch(url).await {
                FetchOutcome::Blocked(status) => {
                    info!("{} blocked {} (HTTP {})", url, strategy.name(), status);
                    blocked = true;
                    break;
                }
                outcome => return accept(strategy, url, outcome),
            }
        }

        if !blocked {
            return None;
        }

        for strategy in self.strategies_of(StrategyKind::Impersonate) {
            if let Some(content) = accept(strategy, url, strategy.fetch(url).await) {
                info!("{} succeeded via {}", url, strategy.name());
                return Some(content);
            }
        }

        warn!("{} stayed blocked after every impersonation profile", url);
        None
    }
}

/// Turn a strategy outcome into usable content; empty bodies count as failure.
fn accept(strategy: &dyn FetchStrategy, url: &str, outcome: FetchOutcome) -> Option<String> {
    match outcome {
        FetchOutcome::Content(body) if !body.trim().is_empty() => Some(body),
        FetchOutcome::Content(_) => {
            debug!("[{}] Empty body from {}", strategy.name(), url);
            None
        }
        FetchOutcome::Blocked(_) | FetchOutcome::Failed => None,
    }
}

#[async_trait]
impl PageFetcher for FetchGateway {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.fetch_page(url).await
    }
}
