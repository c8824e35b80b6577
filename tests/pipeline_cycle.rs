//! End-to-end detection cycles against a stub fetcher and a temporary
//! SQLite database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel_async::SimpleAsyncConnection;

use aerofinder::models::{Airline, Keyword, MonitorUrl, SelectorHints};
use aerofinder::repository::{run_locks, DbContext};
use aerofinder::scrapers::{PageFetcher, UniversalCrawler};
use aerofinder::services::{compute_hash, Pipeline, PipelineError, CYCLE_LOCK};

/// Serves canned pages; anything else fails like an unreachable host.
#[derive(Default)]
struct CannedPages {
    pages: Mutex<HashMap<String, String>>,
}

impl CannedPages {
    fn serve(&self, url: &str, html: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), html.to_string());
    }

    fn take_down(&self, url: &str) {
        self.pages.lock().unwrap().remove(url);
    }
}

#[async_trait]
impl PageFetcher for CannedPages {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.pages.lock().unwrap().get(url).cloned()
    }
}

struct Harness {
    db: DbContext,
    db_url: String,
    pages: Arc<CannedPages>,
    pipeline: Pipeline,
    airline: Airline,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite:{}", dir.path().join("cycle.db").display());
    let db = DbContext::from_url(&db_url);
    db.init_schema().await.unwrap();

    let airline = Airline::new("에어서울", "https://air.test");
    db.airlines().save(&airline).await.unwrap();
    db.keywords().save(&Keyword::new(None, "특가")).await.unwrap();

    let pages = Arc::new(CannedPages::default());
    let pipeline = Pipeline::new(db.clone(), pages.clone(), Arc::new(UniversalCrawler::default()));

    Harness {
        db,
        db_url,
        pages,
        pipeline,
        airline,
        _dir: dir,
    }
}

impl Harness {
    async fn exec(&self, sql: &str) {
        let mut conn = self.db.pool().get().await.unwrap();
        conn.batch_execute(sql).await.unwrap();
    }

    async fn list_monitor(&self, items: &[(u32, &str)]) -> MonitorUrl {
        let monitor = MonitorUrl::new(&self.airline.id, "https://air.test/events").with_selectors(SelectorHints {
            list_link: Some("ul.events li a".to_string()),
            detail_title: Some("strong".to_string()),
            ..Default::default()
        });
        self.db.monitor_urls().save(&monitor).await.unwrap();

        let list: String = items
            .iter()
            .map(|(id, title)| format!(r#"<li><a href="/events/{id}"><strong>{title}</strong></a></li>"#))
            .collect();
        self.pages.serve(&monitor.url, &format!(r#"<ul class="events">{list}</ul>"#));
        monitor
    }
}

#[tokio::test]
async fn single_page_cycle_records_hash_and_is_idempotent() {
    let h = harness().await;
    let monitor = MonitorUrl::new(&h.airline.id, "https://air.test/notice");
    h.db.monitor_urls().save(&monitor).await.unwrap();

    let page = r#"<html><body><div class="board">3월 일본 노선 특가 2026.03.01-2026.03.15</div></body></html>"#;
    h.pages.serve(&monitor.url, page);

    let first = h.pipeline.run_cycle().await.unwrap();
    assert_eq!((first.new_notices, first.deals), (1, 1));

    let stored = h.db.monitor_urls().get(&monitor.id).await.unwrap().unwrap();
    assert_eq!(stored.last_html_hash.as_deref(), Some(compute_hash(page).as_str()));
    assert!(stored.last_checked_at.is_some());

    let second = h.pipeline.run_cycle().await.unwrap();
    assert_eq!((second.new_notices, second.deals), (0, 0));

    let deals = h.db.deals().get_all().await.unwrap();
    assert_eq!(deals.len(), 1);
    assert_eq!(
        deals[0].event_end.map(|d| d.to_rfc3339()).as_deref(),
        Some("2026-03-15T23:59:59+00:00")
    );
}

#[tokio::test]
async fn changed_page_produces_a_second_deal() {
    let h = harness().await;
    let monitor = MonitorUrl::new(&h.airline.id, "https://air.test/notice");
    h.db.monitor_urls().save(&monitor).await.unwrap();

    h.pages.serve(&monitor.url, "<article>봄 특가 오픈</article>");
    h.pipeline.run_cycle().await.unwrap();

    h.pages.serve(&monitor.url, "<article>여름 특가 오픈</article>");
    let report = h.pipeline.run_cycle().await.unwrap();
    assert_eq!(report.deals, 1);

    let deals = h.db.deals().get_all().await.unwrap();
    assert_eq!(deals.len(), 2);
    for deal in &deals {
        let notice_id = deal.notice_id.as_deref().unwrap();
        assert_eq!(h.db.deals().get_by_notice(notice_id).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn fetch_failure_leaves_monitor_untouched() {
    let h = harness().await;
    let monitor = MonitorUrl::new(&h.airline.id, "https://air.test/notice");
    h.db.monitor_urls().save(&monitor).await.unwrap();

    h.pages.serve(&monitor.url, "<article>특가</article>");
    h.pipeline.run_cycle().await.unwrap();
    let before = h.db.monitor_urls().get(&monitor.id).await.unwrap().unwrap();

    h.pages.take_down(&monitor.url);
    let report = h.pipeline.run_cycle().await.unwrap();
    assert_eq!(report.skipped, 1);

    let after = h.db.monitor_urls().get(&monitor.id).await.unwrap().unwrap();
    assert_eq!(after.last_html_hash, before.last_html_hash);
    assert_eq!(after.last_checked_at, before.last_checked_at);
}

#[tokio::test]
async fn list_monitor_only_picks_up_new_items() {
    let h = harness().await;
    let monitor = MonitorUrl::new(&h.airline.id, "https://air.test/events").with_selectors(SelectorHints {
        list_link: Some("ul.events li a".to_string()),
        detail_title: Some("strong".to_string()),
        list_period: Some("em".to_string()),
        list_next: None,
    });
    h.db.monitor_urls().save(&monitor).await.unwrap();

    let item = |id: u32, title: &str| {
        format!(r#"<li><a href="/events/{id}"><strong>{title}</strong></a><em>26.04.01 ~ 26.04.30</em></li>"#)
    };
    h.pages.serve(
        &monitor.url,
        &format!(r#"<ul class="events">{}{}</ul>"#, item(2, "괌 특가"), item(1, "운항 안내")),
    );

    let first = h.pipeline.run_cycle().await.unwrap();
    assert_eq!((first.new_notices, first.deals), (2, 1));

    h.pages.serve(
        &monitor.url,
        &format!(
            r#"<ul class="events">{}{}{}</ul>"#,
            item(3, "사이판 특가"),
            item(2, "괌 특가"),
            item(1, "운항 안내")
        ),
    );
    let second = h.pipeline.run_cycle().await.unwrap();
    assert_eq!((second.new_notices, second.deals), (1, 1));

    let notices = h.db.notices().get_by_airline(&h.airline.id).await.unwrap();
    assert_eq!(notices.len(), 3);
    let guam = notices
        .iter()
        .find(|n| n.source_url == "https://air.test/events/2")
        .unwrap();
    assert!(guam.is_special_deal);
    assert_eq!(
        guam.event_start.map(|d| d.to_rfc3339()).as_deref(),
        Some("2026-04-01T00:00:00+00:00")
    );
}

#[tokio::test]
async fn reset_makes_everything_new_again() {
    let h = harness().await;
    let monitor = MonitorUrl::new(&h.airline.id, "https://air.test/notice");
    h.db.monitor_urls().save(&monitor).await.unwrap();
    h.pages.serve(&monitor.url, "<article>특가</article>");
    h.pipeline.run_cycle().await.unwrap();

    let cleared = h.db.clear_detections().await.unwrap();
    assert_eq!((cleared.deals, cleared.notices, cleared.monitor_urls), (1, 1, 1));

    let report = h.pipeline.run_cycle().await.unwrap();
    assert_eq!((report.new_notices, report.deals), (1, 1));
}

#[tokio::test]
async fn failed_notice_analysis_rolls_back_only_that_notice() {
    let h = harness().await;
    h.list_monitor(&[(3, "사이판 특가"), (2, "오류 특가"), (1, "괌 특가")]).await;
    h.exec(
        "CREATE TRIGGER refuse_deal BEFORE INSERT ON deals WHEN NEW.title LIKE '%오류%'
         BEGIN SELECT RAISE(ABORT, 'deal refused'); END;",
    )
    .await;

    let report = h.pipeline.run_cycle().await.unwrap();
    assert_eq!((report.new_notices, report.deals, report.failed), (3, 2, 1));

    let notices = h.db.notices().get_by_airline(&h.airline.id).await.unwrap();
    assert_eq!(notices.len(), 3);
    for notice in &notices {
        let deals = h.db.deals().get_by_notice(&notice.id).await.unwrap();
        if notice.source_url == "https://air.test/events/2" {
            // The classification saved before the failed insert is undone too.
            assert!(deals.is_empty());
            assert!(!notice.is_special_deal);
            assert_eq!(notice.analyzed_at, None);
        } else {
            assert_eq!(deals.len(), 1);
            assert!(notice.is_special_deal);
            assert!(notice.analyzed_at.is_some());
        }
    }
}

#[tokio::test]
async fn failed_detection_commit_rolls_back_every_target() {
    let h = harness().await;
    let single = MonitorUrl::new(&h.airline.id, "https://air.test/notice");
    h.db.monitor_urls().save(&single).await.unwrap();
    h.pages.serve(&single.url, "<article>봄 특가 오픈</article>");
    let list = h.list_monitor(&[(1, "괌 특가")]).await;

    h.exec(
        "CREATE TRIGGER refuse_notice BEFORE INSERT ON notices WHEN NEW.source_url LIKE '%/events/%'
         BEGIN SELECT RAISE(ABORT, 'notice refused'); END;",
    )
    .await;

    let result = h.pipeline.run_cycle().await;
    assert!(matches!(result, Err(PipelineError::Database(_))));

    for id in [&single.id, &list.id] {
        let stored = h.db.monitor_urls().get(id).await.unwrap().unwrap();
        assert_eq!(stored.last_html_hash, None);
        assert_eq!(stored.last_checked_at, None);
    }
    assert!(h.db.notices().get_by_airline(&h.airline.id).await.unwrap().is_empty());
    assert!(h.db.deals().get_all().await.unwrap().is_empty());

    // The failed cycle released its lease, so the next one runs.
    h.exec("DROP TRIGGER refuse_notice;").await;
    let report = h.pipeline.run_cycle().await.unwrap();
    assert_eq!((report.new_notices, report.deals), (2, 2));
}

#[tokio::test]
async fn cycle_is_refused_while_another_process_holds_the_lease() {
    let h = harness().await;
    let monitor = MonitorUrl::new(&h.airline.id, "https://air.test/notice");
    h.db.monitor_urls().save(&monitor).await.unwrap();
    h.pages.serve(&monitor.url, "<article>특가</article>");

    // A second context on the same file stands in for another process.
    let other = DbContext::from_url(&h.db_url);
    let mut conn = other.pool().get().await.unwrap();
    let lease = Duration::minutes(30);
    assert!(run_locks::try_acquire(&mut conn, CYCLE_LOCK, "watch-process", Utc::now(), lease)
        .await
        .unwrap());

    let result = h.pipeline.run_cycle().await;
    assert!(matches!(result, Err(PipelineError::Busy)));
    assert!(h.db.notices().get_by_airline(&h.airline.id).await.unwrap().is_empty());
    let stored = h.db.monitor_urls().get(&monitor.id).await.unwrap().unwrap();
    assert_eq!(stored.last_html_hash, None);

    assert!(run_locks::release(&mut conn, CYCLE_LOCK, "watch-process").await.unwrap());
    let report = h.pipeline.run_cycle().await.unwrap();
    assert_eq!((report.new_notices, report.deals), (1, 1));
    assert_eq!(run_locks::holder(&mut conn, CYCLE_LOCK).await.unwrap(), None);
}
