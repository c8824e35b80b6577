//! Detect-then-analyze crawl cycle.
//!
//! Phase 1 fetches and crawls every monitored URL, then commits all crawl
//! state and new notices in one transaction. Phase 2 classifies each new
//! notice and pushes deals, one transaction per notice, so one bad
//! notice never blocks the rest.
//!
//! Each cycle holds the `crawl-cycle` lease in the database for its whole
//! run, so cycles never overlap, even across processes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use diesel_async::AsyncConnection;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::classifier::Classifier;
use super::deal_push::build_deal;
use crate::models::Deal;
use crate::repository::{
    airlines, deals, keywords, monitor_urls, notices, run_locks, DbContext, DbError,
};
use crate::scrapers::{CrawlOutcome, CrawlStrategy, PageFetcher};

/// Errors that abort a cycle.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("another crawl cycle is already running")]
    Busy,
}

/// Name of the lease held while a cycle runs.
pub const CYCLE_LOCK: &str = "crawl-cycle";

/// How long a cycle's lease lasts before another process may reclaim it.
const CYCLE_LEASE_MINUTES: i64 = 30;

/// Counts for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub targets: usize,
    pub skipped: usize,
    pub new_notices: usize,
    pub deals: usize,
    /// Notices whose analysis failed and was rolled back.
    pub failed: usize,
}

/// The crawl pipeline over one database.
#[derive(Clone)]
pub struct Pipeline {
    db: DbContext,
    fetcher: Arc<dyn PageFetcher>,
    crawler: Arc<dyn CrawlStrategy>,
}

impl Pipeline {
    pub fn new(db: DbContext, fetcher: Arc<dyn PageFetcher>, crawler: Arc<dyn CrawlStrategy>) -> Self {
        Self { db, fetcher, crawler }
    }

    pub fn db(&self) -> &DbContext {
        &self.db
    }

    /// Run one full cycle, or fail with [`PipelineError::Busy`] if another
    /// cycle holds the lease.
    pub async fn run_cycle(&self) -> Result<CycleReport, PipelineError> {
        let holder = uuid::Uuid::new_v4().to_string();
        {
            let mut conn = self.db.pool().get().await?;
            let lease = Duration::minutes(CYCLE_LEASE_MINUTES);
            if !run_locks::try_acquire(&mut conn, CYCLE_LOCK, &holder, Utc::now(), lease).await? {
                return Err(PipelineError::Busy);
            }
        }

        let result = self.run_locked().await;

        match self.db.pool().get().await {
            Ok(mut conn) => {
                if let Err(e) = run_locks::release(&mut conn, CYCLE_LOCK, &holder).await {
                    warn!("Failed to release cycle lease: {}", e);
                }
            }
            Err(e) => warn!("Failed to release cycle lease: {}", e),
        }
        result
    }

    async fn run_locked(&self) -> Result<CycleReport, PipelineError> {
        let mut report = CycleReport::default();

        let notice_ids = self.detect(&mut report).await?;
        report.new_notices = notice_ids.len();

        for id in &notice_ids {
            match self.analyze_notice(id).await {
                Ok(Some(deal)) => {
                    info!("Pushed deal {} ({:?}) from notice {}", deal.id, deal.title, id);
                    report.deals += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Analysis of notice {} failed, rolled back: {}", id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Cycle done: {} targets ({} skipped), {} new notices, {} deals",
            report.targets, report.skipped, report.new_notices, report.deals
        );
        Ok(report)
    }

    /// Phase 1. Returns the ids of the notices inserted.
    async fn detect(&self, report: &mut CycleReport) -> Result<Vec<String>, PipelineError> {
        let (targets, mut seen) = {
            let mut conn = self.db.pool().get().await?;
            let targets = monitor_urls::load_all(&mut conn).await?;

            let mut seen: HashMap<String, HashSet<String>> = HashMap::new();
            for target in &targets {
                if !seen.contains_key(&target.airline_id) {
                    let urls = notices::source_urls_for_airline(&mut conn, &target.airline_id).await?;
                    seen.insert(target.airline_id.clone(), urls);
                }
            }
            (targets, seen)
        };
        report.targets = targets.len();

        let mut outcomes: Vec<CrawlOutcome> = Vec::with_capacity(targets.len());
        for target in &targets {
            let Some(html) = self.fetcher.fetch(&target.url).await else {
                warn!("Skipping {}: fetch failed", target.url);
                report.skipped += 1;
                continue;
            };

            let seen_urls = seen.entry(target.airline_id.clone()).or_default();
            let outcome = self
                .crawler
                .crawl(self.fetcher.as_ref(), target, &html, seen_urls, Utc::now())
                .await;
            debug!(
                "{}: {} with {} new notices",
                target.url,
                outcome.change.as_str(),
                outcome.notices.len()
            );
            outcomes.push(outcome);
        }

        let mut conn = self.db.pool().get().await?;
        let outcomes = &outcomes;
        let committed = conn
            .transaction(|conn| {
                Box::pin(async move {
                    let mut ids = Vec::new();
                    for outcome in outcomes {
                        monitor_urls::update_crawl_state(
                            conn,
                            &outcome.monitor_url_id,
                            &outcome.content_hash,
                            outcome.checked_at,
                        )
                        .await?;
                        for notice in &outcome.notices {
                            notices::insert(conn, notice).await?;
                            ids.push(notice.id.clone());
                        }
                    }
                    Ok::<_, DbError>(ids)
                })
            })
            .await;

        match committed {
            Ok(ids) => {
                info!("Committed {} crawl states and {} notices", outcomes.len(), ids.len());
                Ok(ids)
            }
            Err(e) => {
                error!("Detection commit rolled back: {}", e);
                Err(e.into())
            }
        }
    }

    /// Phase 2 for one notice: classify, save, and push a deal if warranted.
    async fn analyze_notice(&self, id: &str) -> Result<Option<Deal>, DbError> {
        let mut conn = self.db.pool().get().await?;
        let now = Utc::now();

        conn.transaction(|conn| {
            Box::pin(async move {
                let Some(mut notice) = notices::find(conn, id).await? else {
                    warn!("Notice {} vanished before analysis", id);
                    return Ok(None);
                };

                let keywords = keywords::for_airline(conn, &notice.airline_id).await?;
                let is_deal = Classifier::new(&keywords).classify(&mut notice, now);
                notices::save_analysis(conn, &notice).await?;

                if !is_deal {
                    return Ok(None);
                }
                if deals::exists_for_notice(conn, &notice.id).await? {
                    debug!("Notice {} already has a deal", notice.id);
                    return Ok(None);
                }
                let Some(airline) = airlines::find(conn, &notice.airline_id).await? else {
                    warn!("Airline {} not found for notice {}", notice.airline_id, notice.id);
                    return Ok(None);
                };

                match build_deal(&notice, &airline) {
                    Some(new_deal) => Ok(Some(deals::insert(conn, &new_deal, now).await?)),
                    None => Ok(None),
                }
            })
        })
        .await
    }
}
