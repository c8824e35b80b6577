//! reqwest-backed fetch strategies.
//!
//! The direct strategy sends a full set of browser-like headers derived
//! from the target's origin. Impersonation strategies pose as a specific
//! browser family with a minimal header set and are only used after the
//! direct request was refused.

mod user_agent;

pub use user_agent::{resolve_profiles, BrowserProfile, ACCEPT_LANGUAGE, USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::fetch::{FetchOutcome, FetchStrategy, StrategyKind};

/// Scheme and host of a URL, e.g. `https://www.jejuair.net`.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// Headers a desktop Chrome sends when navigating within `url`'s site.
pub fn browser_headers(url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let pairs: [(&str, &str); 9] = [
        ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"),
        ("accept-language", ACCEPT_LANGUAGE),
        ("cache-control", "max-age=0"),
        ("sec-ch-ua", "\"Google Chrome\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\""),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "same-origin"),
    ];
    for (name, value) in pairs {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    if let Some(origin) = origin_of(url) {
        if let Ok(value) = HeaderValue::from_str(&format!("{}/", origin)) {
            headers.insert(reqwest::header::REFERER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&origin) {
            headers.insert(reqwest::header::ORIGIN, value);
        }
    }
    headers
}

/// Minimal headers used by the impersonation profiles.
fn profile_headers(profile: BrowserProfile, url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static(profile.accept()),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    if let Some(origin) = origin_of(url) {
        if let Ok(value) = HeaderValue::from_str(&format!("{}/", origin)) {
            headers.insert(reqwest::header::REFERER, value);
        }
    }
    headers
}

/// An HTTP fetch strategy wrapping one configured reqwest client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    kind: StrategyKind,
    name: String,
    profile: Option<BrowserProfile>,
}

impl HttpClient {
    /// Create the direct strategy.
    pub fn direct(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            kind: StrategyKind::Direct,
            name: "direct".to_string(),
            profile: None,
        })
    }

    /// Create an impersonation strategy for one browser profile.
    pub fn impersonating(profile: BrowserProfile, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(profile.user_agent())
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            kind: StrategyKind::Impersonate,
            name: format!("impersonate:{}", profile.as_str()),
            profile: Some(profile),
        })
    }

    fn headers_for(&self, url: &str) -> HeaderMap {
        match self.profile {
            Some(profile) => profile_headers(profile, url),
            None => browser_headers(url),
        }
    }
}

#[async_trait]
impl FetchStrategy for HttpClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).headers(self.headers_for(url)).send().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    warn!("[{}] Timed out fetching {}", self.name, url);
                } else {
                    warn!("[{}] Request to {} failed: {}", self.name, url, e);
                }
                return FetchOutcome::Failed;
            }
        };

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            debug!("[{}] {} answered 403", self.name, url);
            return FetchOutcome::Blocked(status.as_u16());
        }
        if !status.is_success() {
            warn!("[{}] {} answered HTTP {}", self.name, url, status.as_u16());
            return FetchOutcome::Failed;
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Content(body),
            Err(e) => {
                warn!("[{}] Failed to read body of {}: {}", self.name, url, e);
                FetchOutcome::Failed
            }
        }
    }
}
