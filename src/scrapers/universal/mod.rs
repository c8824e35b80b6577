//! Universal crawler.
//!
//! One algorithm handles every carrier. A monitored URL without a list
//! selector is treated as a single page and only yields a notice when its
//! digest changes. A URL with a list selector is walked as a paginated
//! list of detail links, yielding a notice for each link not seen before.
//!
//! The crawler performs no persistence: it returns a [`CrawlOutcome`]
//! which the pipeline commits.

mod links;
mod list_detail;
mod period;
mod selectors;
mod single_page;
mod title;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info, warn};

pub use links::{normalize_url, resolve_element_link};
pub use list_detail::{extract_list_page, ListCandidate, ListPage};
pub use period::parse_event_period;
pub use selectors::{normalize_link_selector, normalize_title_selector};
pub use single_page::{extract_page_content, PageContent};
pub use title::{extract_detail_title, is_usable_list_title};

use super::fetch::PageFetcher;
use crate::models::{ContentType, MonitorUrl, Notice};
use crate::services::change_detection::{compute_hash, ChangeState, FirstSightPolicy};

/// Upper bound on list pages followed in one crawl.
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Result of crawling one monitored URL.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub monitor_url_id: String,
    /// Digest of the fetched (first) page.
    pub content_hash: String,
    pub checked_at: DateTime<Utc>,
    pub change: ChangeState,
    /// New, unanalyzed notices in insertion order.
    pub notices: Vec<Notice>,
}

/// Turns a fetched monitored page into new notices.
#[async_trait]
pub trait CrawlStrategy: Send + Sync {
    /// Crawl `target` whose current content is `html`.
    ///
    /// `seen` holds the airline's known source URLs and is extended with
    /// every URL emitted, so later targets of the same airline don't
    /// duplicate it. `fetcher` is used for pagination and detail pages.
    async fn crawl(
        &self,
        fetcher: &dyn PageFetcher,
        target: &MonitorUrl,
        html: &str,
        seen: &mut HashSet<String>,
        now: DateTime<Utc>,
    ) -> CrawlOutcome;
}

/// The default crawl strategy.
#[derive(Debug, Clone)]
pub struct UniversalCrawler {
    first_sight: FirstSightPolicy,
    max_pages: usize,
}

impl Default for UniversalCrawler {
    fn default() -> Self {
        Self::new(FirstSightPolicy::default())
    }
}

impl UniversalCrawler {
    pub fn new(first_sight: FirstSightPolicy) -> Self {
        Self {
            first_sight,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn crawl_single_page(
        &self,
        target: &MonitorUrl,
        html: &str,
        change: ChangeState,
        now: DateTime<Utc>,
    ) -> Vec<Notice> {
        if !self.first_sight.should_extract(change) {
            debug!("{}: {}, nothing to extract", target.url, change.as_str());
            return Vec::new();
        }

        let content = extract_page_content(html, &target.url);
        let (content_type, raw) = content.classify(html);
        info!(
            "{}: {} page, new {} notice",
            target.url,
            change.as_str(),
            content_type.as_str()
        );
        vec![Notice::new(&target.airline_id, &target.url, content_type, raw, now)]
    }

    /// Walk the list pages, newest first, until a known URL or the page
    /// limit is reached.
    async fn collect_candidates(
        &self,
        fetcher: &dyn PageFetcher,
        target: &MonitorUrl,
        first_page: &str,
        seen: &HashSet<String>,
    ) -> Vec<ListCandidate> {
        let mut collected = Vec::new();
        let mut page_url = target.url.clone();
        let mut html = first_page.to_string();

        for page_number in 1..=self.max_pages {
            let page = extract_list_page(&html, &page_url, &target.selectors);
            if page.candidates.is_empty() {
                debug!("{}: page {} has no candidates", target.url, page_number);
                break;
            }

            let mut reached_known = false;
            for candidate in page.candidates {
                if seen.contains(&candidate.url) {
                    reached_known = true;
                    break;
                }
                collected.push(candidate);
            }
            if reached_known {
                debug!("{}: reached a known notice on page {}", target.url, page_number);
                break;
            }
            if page_number == self.max_pages {
                break;
            }

            let Some(next_url) = page.next_url else {
                break;
            };
            if next_url == normalize_url(&page_url) {
                break;
            }
            match fetcher.fetch(&next_url).await {
                Some(next_html) => {
                    html = next_html;
                    page_url = next_url;
                }
                None => {
                    warn!("{}: failed to fetch next page {}", target.url, next_url);
                    break;
                }
            }
        }

        collected
    }

    async fn crawl_list(
        &self,
        fetcher: &dyn PageFetcher,
        target: &MonitorUrl,
        html: &str,
        seen: &mut HashSet<String>,
        now: DateTime<Utc>,
    ) -> Vec<Notice> {
        let mut candidates = self.collect_candidates(fetcher, target, html, seen).await;
        candidates.reverse();

        let mut notices = Vec::new();
        for candidate in candidates {
            if seen.contains(&candidate.url) {
                continue;
            }

            let title = match candidate.title.as_deref().map(str::trim) {
                Some(title) if is_usable_list_title(title) => title.to_string(),
                _ => match fetcher.fetch(&candidate.url).await {
                    Some(detail) => {
                        extract_detail_title(&detail, target.selectors.detail_title.as_deref())
                    }
                    None => {
                        warn!("Skipping {}: detail page unavailable", candidate.url);
                        continue;
                    }
                },
            };

            let (event_start, event_end) = candidate
                .period
                .as_deref()
                .map(|p| parse_event_period(p, now.year()))
                .unwrap_or((None, None));

            let mut notice = Notice::new(
                &target.airline_id,
                &candidate.url,
                ContentType::Text,
                title.clone(),
                now,
            );
            notice.extracted_text = Some(title);
            notice.event_start = event_start;
            notice.event_end = event_end;

            seen.insert(candidate.url);
            notices.push(notice);
        }

        if !notices.is_empty() {
            info!("{}: {} new list notices", target.url, notices.len());
        }
        notices
    }
}

#[async_trait]
impl CrawlStrategy for UniversalCrawler {
    async fn crawl(
        &self,
        fetcher: &dyn PageFetcher,
        target: &MonitorUrl,
        html: &str,
        seen: &mut HashSet<String>,
        now: DateTime<Utc>,
    ) -> CrawlOutcome {
        let content_hash = compute_hash(html);
        let change = ChangeState::assess(target.last_html_hash.as_deref(), &content_hash);

        let notices = if target.selectors.is_list_mode() {
            self.crawl_list(fetcher, target, html, seen, now).await
        } else {
            self.crawl_single_page(target, html, change, now)
        };

        CrawlOutcome {
            monitor_url_id: target.id.clone(),
            content_hash,
            checked_at: now,
            change,
            notices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectorHints;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const LIST: &str = "https://www.air.test/ko/event/list";

    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Option<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned()
        }
    }

    fn list_target() -> MonitorUrl {
        MonitorUrl::new("air-1", LIST).with_selectors(SelectorHints {
            list_link: Some("ul.board li a".to_string()),
            detail_title: Some("tit".to_string()),
            list_period: Some("date".to_string()),
            list_next: Some("a.next".to_string()),
        })
    }

    fn row(id: u32, title: &str) -> String {
        format!(
            r#"<li><a href="/ko/event/{id}"><span class="tit">{title}</span></a><span class="date">2026.03.01 ~ 2026.03.31</span></li>"#
        )
    }

    fn now() -> DateTime<Utc> {
        "2026-02-20T09:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn test_pagination_stops_at_known_notice() {
        let page1 = format!(
            r#"<ul class="board">{}{}</ul><a class="next" href="?page=2">다음</a>"#,
            row(1, "봄 특가 A"),
            row(2, "봄 특가 B")
        );
        let page2 = format!(
            r#"<ul class="board">{}{}{}</ul><a class="next" href="?page=3">다음</a>"#,
            row(3, "봄 특가 C"),
            row(4, "이미 본 공지"),
            row(5, "오래된 공지")
        );
        let fetcher = StubFetcher::default().with_page(&format!("{LIST}?page=2"), &page2);
        let mut seen: HashSet<String> =
            ["https://www.air.test/ko/event/4".to_string()].into_iter().collect();

        let outcome = UniversalCrawler::default()
            .crawl(&fetcher, &list_target(), &page1, &mut seen, now())
            .await;

        let urls: Vec<_> = outcome.notices.iter().map(|n| n.source_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.air.test/ko/event/3",
                "https://www.air.test/ko/event/2",
                "https://www.air.test/ko/event/1",
            ]
        );
        assert_eq!(fetcher.requested(), vec![format!("{LIST}?page=2")]);

        let first = &outcome.notices[0];
        assert_eq!(first.raw_content, "봄 특가 C");
        assert_eq!(first.extracted_text.as_deref(), Some("봄 특가 C"));
        assert_eq!(first.event_start, Some("2026-03-01T00:00:00Z".parse().unwrap()));
        assert_eq!(first.event_end, Some("2026-03-31T23:59:59Z".parse().unwrap()));
        assert_eq!(seen.len(), 4);
    }

    #[tokio::test]
    async fn test_list_crawl_is_idempotent() {
        let page = format!(r#"<ul class="board">{}</ul>"#, row(1, "봄 특가 A"));
        let fetcher = StubFetcher::default();
        let crawler = UniversalCrawler::default();
        let target = list_target();
        let mut seen = HashSet::new();

        let first = crawler.crawl(&fetcher, &target, &page, &mut seen, now()).await;
        assert_eq!(first.notices.len(), 1);

        let second = crawler.crawl(&fetcher, &target, &page, &mut seen, now()).await;
        assert!(second.notices.is_empty());
        assert_eq!(first.content_hash, second.content_hash);
    }

    #[tokio::test]
    async fn test_unusable_list_title_uses_detail_page() {
        let page = format!(
            r#"<ul class="board">{}{}</ul>"#,
            row(1, "공지"),
            row(2, "·")
        );
        let fetcher = StubFetcher::default().with_page(
            "https://www.air.test/ko/event/1",
            r#"<html><head><title>여름 얼리버드 특가</title></head></html>"#,
        );
        let mut seen = HashSet::new();

        let outcome = UniversalCrawler::default()
            .crawl(&fetcher, &list_target(), &page, &mut seen, now())
            .await;

        // Detail page 2 is unavailable and is skipped without being marked seen.
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].raw_content, "여름 얼리버드 특가");
        assert!(!seen.contains("https://www.air.test/ko/event/2"));
    }

    #[tokio::test]
    async fn test_single_page_first_sight_and_change() {
        let fetcher = StubFetcher::default();
        let mut target = MonitorUrl::new("air-1", "https://www.air.test/notice");
        let html = r#"<div class="notice">3월 국내선 특가 안내</div>"#;
        let mut seen = HashSet::new();

        let outcome = UniversalCrawler::default()
            .crawl(&fetcher, &target, html, &mut seen, now())
            .await;
        assert_eq!(outcome.change, ChangeState::FirstSight);
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].source_url, "https://www.air.test/notice");
        assert_eq!(outcome.notices[0].raw_content, "3월 국내선 특가 안내");

        target.last_html_hash = Some(outcome.content_hash.clone());
        let unchanged = UniversalCrawler::default()
            .crawl(&fetcher, &target, html, &mut seen, now())
            .await;
        assert_eq!(unchanged.change, ChangeState::Unchanged);
        assert!(unchanged.notices.is_empty());

        let changed = UniversalCrawler::default()
            .crawl(&fetcher, &target, "<main>4월 특가</main>", &mut seen, now())
            .await;
        assert_eq!(changed.change, ChangeState::Changed);
        assert_eq!(changed.notices.len(), 1);
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_record_only_first_sight() {
        let fetcher = StubFetcher::default();
        let target = MonitorUrl::new("air-1", "https://www.air.test/notice");
        let mut seen = HashSet::new();

        let outcome = UniversalCrawler::new(FirstSightPolicy::RecordOnly)
            .crawl(&fetcher, &target, "<article>특가</article>", &mut seen, now())
            .await;
        assert!(outcome.notices.is_empty());
        assert_eq!(outcome.content_hash, compute_hash("<article>특가</article>"));
    }
}
