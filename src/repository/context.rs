//! Database context for managing connections and repository access.

use diesel_async::{AsyncConnection, SimpleAsyncConnection};
use tracing::info;

use super::pool::{DbError, SqliteConn, SqlitePool};
use super::{
    deals, monitor_urls, notices, AirlineRepository, DealRepository, KeywordRepository,
    MonitorUrlRepository, NoticeRepository,
};

/// Counts reported by [`DbContext::clear_detections`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub deals: usize,
    pub notices: usize,
    pub monitor_urls: usize,
}

/// Database context that owns the pool and hands out repositories.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:aerofinder.db");
/// ctx.init_schema().await?;
/// let targets = ctx.monitor_urls().get_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbContext {
    pool: SqlitePool,
}

impl DbContext {
    /// Create a context from a database URL or file path.
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: SqlitePool::new(database_url),
        }
    }

    /// Create a context with an existing pool.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn airlines(&self) -> AirlineRepository {
        AirlineRepository::new(self.pool.clone())
    }

    pub fn keywords(&self) -> KeywordRepository {
        KeywordRepository::new(self.pool.clone())
    }

    pub fn monitor_urls(&self) -> MonitorUrlRepository {
        MonitorUrlRepository::new(self.pool.clone())
    }

    pub fn notices(&self) -> NoticeRepository {
        NoticeRepository::new(self.pool.clone())
    }

    pub fn deals(&self) -> DealRepository {
        DealRepository::new(self.pool.clone())
    }

    /// Create all tables and indexes if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        Self::init_sqlite_schema(&mut conn).await
    }

    async fn init_sqlite_schema(conn: &mut SqliteConn) -> Result<(), DbError> {
        conn.batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS airlines (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                base_url TEXT NOT NULL,
                logo_url TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS keywords (
                id TEXT PRIMARY KEY,
                airline_id TEXT REFERENCES airlines(id) ON DELETE CASCADE,
                keyword TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_keywords_airline ON keywords(airline_id);

            CREATE TABLE IF NOT EXISTS monitor_urls (
                id TEXT PRIMARY KEY,
                airline_id TEXT NOT NULL REFERENCES airlines(id) ON DELETE CASCADE,
                url TEXT NOT NULL,
                last_html_hash TEXT,
                last_checked_at TEXT,
                list_link_selector TEXT,
                detail_title_selector TEXT,
                list_period_selector TEXT,
                list_next_selector TEXT
            );

            CREATE TABLE IF NOT EXISTS notices (
                id TEXT PRIMARY KEY,
                airline_id TEXT NOT NULL REFERENCES airlines(id) ON DELETE CASCADE,
                source_url TEXT NOT NULL,
                content_type TEXT NOT NULL DEFAULT 'text',
                raw_content TEXT NOT NULL,
                extracted_text TEXT,
                event_start TEXT,
                event_end TEXT,
                routes TEXT,
                is_special_deal BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                analyzed_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_notices_airline_source
                ON notices(airline_id, source_url);

            CREATE TABLE IF NOT EXISTS deals (
                id TEXT PRIMARY KEY,
                notice_id TEXT REFERENCES notices(id) ON DELETE SET NULL,
                airline_id TEXT NOT NULL REFERENCES airlines(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                url TEXT,
                event_start TEXT,
                event_end TEXT,
                routes TEXT,
                price INTEGER,
                image_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_deals_notice ON deals(notice_id);

            CREATE TABLE IF NOT EXISTS run_locks (
                name TEXT PRIMARY KEY,
                holder TEXT NOT NULL,
                acquired_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );
            "#,
        )
        .await
    }

    /// Delete every deal and notice and forget all crawl state.
    ///
    /// The next cycle treats every monitored page as first sight.
    pub async fn clear_detections(&self) -> Result<ClearReport, DbError> {
        let mut conn = self.pool.get().await?;

        let report = conn
            .transaction(|conn| {
                Box::pin(async move {
                    let deals = deals::delete_all(conn).await?;
                    let notices = notices::delete_all(conn).await?;
                    let monitor_urls = monitor_urls::reset_crawl_state(conn).await?;
                    Ok::<_, DbError>(ClearReport {
                        deals,
                        notices,
                        monitor_urls,
                    })
                })
            })
            .await?;

        info!(
            "Cleared {} deals and {} notices; reset {} monitored URLs",
            report.deals, report.notices, report.monitor_urls
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, Notice};
    use crate::repository::test_support::{seed_airline, setup_test_db};
    use chrono::Utc;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let (ctx, _dir) = setup_test_db().await;
        ctx.init_schema().await.unwrap();
        assert!(ctx.airlines().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_detections_resets_state() {
        let (ctx, _dir) = setup_test_db().await;
        let (airline, mut monitor) = seed_airline(&ctx, "테스트항공", "https://air.test/notice").await;

        monitor.last_html_hash = Some("abc".to_string());
        monitor.last_checked_at = Some(Utc::now());
        ctx.monitor_urls().save(&monitor).await.unwrap();

        let notice = Notice::new(
            &airline.id,
            "https://air.test/notice/1",
            ContentType::Text,
            "특가",
            Utc::now(),
        );
        ctx.notices().insert(&notice).await.unwrap();

        let report = ctx.clear_detections().await.unwrap();
        assert_eq!(report.notices, 1);
        assert_eq!(report.monitor_urls, 1);

        let reloaded = ctx.monitor_urls().get(&monitor.id).await.unwrap().unwrap();
        assert_eq!(reloaded.last_html_hash, None);
        assert_eq!(reloaded.last_checked_at, None);
        assert!(ctx.notices().get_by_airline(&airline.id).await.unwrap().is_empty());
    }
}
