//! Browser-based fetcher for Cloudflare-fronted airline sites.
//!
//! Uses chromiumoxide (CDP). Some carriers only serve their notice boards
//! after a JavaScript challenge, so their domains bypass the HTTP
//! strategies entirely and come straight here.

mod config;

pub use config::BrowserEngineConfig;

use async_trait::async_trait;
use tracing::warn;

use super::fetch::{FetchOutcome, FetchStrategy, StrategyKind};

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use anyhow::{Context, Result};
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tracing::{debug, info};

#[cfg(feature = "browser")]
use super::http_client::USER_AGENT;

/// Page titles shown while a Cloudflare challenge is running.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const CHALLENGE_TITLES: &[&str] = &["just a moment", "잠시만 기다리십시오", "attention required"];

/// Whether a page title indicates an anti-bot interstitial.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn is_challenge_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    CHALLENGE_TITLES.iter().any(|t| lower.contains(t))
}

/// Browser-based fetcher.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
    browser: Option<Browser>,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    /// Create a new browser fetcher. The browser starts lazily.
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self {
            config,
            browser: None,
        }
    }

    /// Find Chrome executable.
    fn find_chrome() -> Result<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found; install it or set browser.remote_url"
        ))
    }

    /// Launch or connect to browser if not already running.
    async fn ensure_browser(&mut self) -> Result<&Browser> {
        if self.browser.is_none() {
            let browser = match self.config.remote_url.clone() {
                Some(remote_url) => self.connect_remote(&remote_url).await?,
                None => self.launch().await?,
            };
            self.browser = Some(browser);
        }

        self.browser
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("browser unavailable"))
    }

    async fn launch(&self) -> Result<Browser> {
        info!("Launching browser (headless={})", self.config.headless);

        let mut builder = BrowserConfig::builder().chrome_executable(Self::find_chrome()?);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--lang=ko-KR")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(&self, url: &str) -> Result<Browser> {
        info!("Connecting to remote browser at {}", url);

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout))
            .build()
            .context("Failed to build HTTP client")?;
        let resp: serde_json::Value = client
            .get(&version_url)
            .send()
            .await
            .context("Failed to connect to remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .context("Failed to connect to remote browser")?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    /// Render a URL and return the resulting HTML.
    ///
    /// The whole fetch, including launching or connecting to the browser,
    /// runs under the configured timeout. Any failure drops the browser so
    /// the next fetch starts a fresh one.
    pub async fn fetch(&mut self, url: &str) -> Result<String> {
        let timeout = Duration::from_secs(self.config.timeout);

        let result = match tokio::time::timeout(timeout, self.fetch_page(url)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!("Timed out after {:?} fetching {}", timeout, url)),
        };

        if result.is_err() {
            self.close().await;
        }
        result
    }

    async fn fetch_page(&mut self, url: &str) -> Result<String> {
        let challenge_wait = Duration::from_secs(self.config.challenge_wait);

        let browser = self.ensure_browser().await?;
        let page = browser.new_page("about:blank").await?;
        let result = Self::render(&page, url, challenge_wait).await;

        // Close the page to prevent tab accumulation
        let _ = page.close().await;
        result
    }

    /// Drop the browser; the next fetch launches or reconnects.
    pub async fn close(&mut self) {
        if self.browser.take().is_some() {
            debug!("Browser dropped");
        }
    }

    async fn render(page: &Page, url: &str, challenge_wait: Duration) -> Result<String> {
        page.execute(SetUserAgentOverrideParams::new(USER_AGENT.to_string()))
            .await?;

        info!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid URL: {}", e))?;
        page.execute(nav_params).await?;
        page.wait_for_navigation().await?;

        let title = page.get_title().await?.unwrap_or_default();
        if is_challenge_title(&title) {
            debug!("Challenge page on {}, waiting {:?}", url, challenge_wait);
            tokio::time::sleep(challenge_wait).await;
        }

        Ok(page.content().await?)
    }
}

/// Fetch strategy backed by the browser.
pub struct BrowserStrategy {
    #[cfg(feature = "browser")]
    fetcher: Mutex<BrowserFetcher>,
    #[cfg(not(feature = "browser"))]
    _config: BrowserEngineConfig,
}

impl BrowserStrategy {
    #[cfg(feature = "browser")]
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self {
            fetcher: Mutex::new(BrowserFetcher::new(config)),
        }
    }

    #[cfg(not(feature = "browser"))]
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { _config: config }
    }
}

#[async_trait]
impl FetchStrategy for BrowserStrategy {
    fn name(&self) -> &str {
        "browser"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Browser
    }

    #[cfg(feature = "browser")]
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut fetcher = self.fetcher.lock().await;
        match fetcher.fetch(url).await {
            Ok(content) => FetchOutcome::Content(content),
            Err(e) => {
                warn!("[browser] Failed to render {}: {:#}", url, e);
                FetchOutcome::Failed
            }
        }
    }

    #[cfg(not(feature = "browser"))]
    async fn fetch(&self, url: &str) -> FetchOutcome {
        warn!(
            "[browser] {} needs the browser, but aerofinder was built without the `browser` feature",
            url
        );
        FetchOutcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_titles() {
        assert!(is_challenge_title("Just a moment..."));
        assert!(is_challenge_title("잠시만 기다리십시오…"));
        assert!(!is_challenge_title("진에어 | 이벤트"));
    }

    /// Accepts connections and never answers.
    #[cfg(feature = "browser")]
    async fn silent_listener() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    #[cfg(feature = "browser")]
    #[tokio::test]
    async fn test_unresponsive_remote_browser_times_out() {
        let addr = silent_listener().await;
        let mut fetcher = BrowserFetcher::new(BrowserEngineConfig {
            remote_url: Some(format!("ws://{}", addr)),
            timeout: 1,
            ..Default::default()
        });

        let started = std::time::Instant::now();
        assert!(fetcher.fetch("https://www.airline.test/event").await.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(fetcher.browser.is_none());

        // A later fetch tries again instead of reusing a dead browser.
        assert!(fetcher.fetch("https://www.airline.test/event").await.is_err());
        assert!(fetcher.browser.is_none());
    }

    #[cfg(feature = "browser")]
    #[tokio::test]
    async fn test_strategy_reports_failure_on_timeout() {
        let addr = silent_listener().await;
        let strategy = BrowserStrategy::new(BrowserEngineConfig {
            remote_url: Some(format!("ws://{}", addr)),
            timeout: 1,
            ..Default::default()
        });
        assert_eq!(strategy.fetch("https://www.airline.test/event").await, FetchOutcome::Failed);
    }

    #[test]
    fn test_browser_strategy_kind() {
        let strategy = BrowserStrategy::new(BrowserEngineConfig::default());
        assert_eq!(strategy.kind(), StrategyKind::Browser);
        assert_eq!(strategy.name(), "browser");
    }
}
