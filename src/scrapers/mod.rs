//! Page retrieval and content extraction for monitored airline sites.

pub mod browser;
pub mod fetch;
pub mod http_client;
pub mod universal;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use browser::{BrowserEngineConfig, BrowserStrategy};
pub use fetch::{FetchGateway, FetchOutcome, FetchStrategy, PageFetcher, StrategyKind};
pub use http_client::{BrowserProfile, HttpClient};
pub use universal::{CrawlOutcome, CrawlStrategy, UniversalCrawler};
