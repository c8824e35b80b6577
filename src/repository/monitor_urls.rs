//! Monitored URL persistence and crawl state.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{DbError, SqliteConn, SqlitePool};
use super::records::MonitorUrlRecord;
use crate::models::MonitorUrl;
use crate::schema::monitor_urls;

/// Load every monitored URL in a stable order.
pub async fn load_all(conn: &mut SqliteConn) -> Result<Vec<MonitorUrl>, DbError> {
    monitor_urls::table
        .order((monitor_urls::airline_id.asc(), monitor_urls::url.asc()))
        .select(MonitorUrlRecord::as_select())
        .load(conn)
        .await
        .map(|records| records.into_iter().map(MonitorUrl::from).collect())
}

/// Record the digest and check time of a successful crawl.
pub async fn update_crawl_state(
    conn: &mut SqliteConn,
    id: &str,
    hash: &str,
    checked_at: DateTime<Utc>,
) -> Result<(), DbError> {
    diesel::update(monitor_urls::table.find(id))
        .set((
            monitor_urls::last_html_hash.eq(Some(hash)),
            monitor_urls::last_checked_at.eq(Some(checked_at.to_rfc3339())),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

/// Forget crawl state for every monitored URL. Returns the number of rows touched.
pub async fn reset_crawl_state(conn: &mut SqliteConn) -> Result<usize, DbError> {
    diesel::update(monitor_urls::table)
        .set((
            monitor_urls::last_html_hash.eq(None::<String>),
            monitor_urls::last_checked_at.eq(None::<String>),
        ))
        .execute(conn)
        .await
}

/// Monitored URL repository.
#[derive(Debug, Clone)]
pub struct MonitorUrlRepository {
    pool: SqlitePool,
}

impl MonitorUrlRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<Option<MonitorUrl>, DbError> {
        let mut conn = self.pool.get().await?;

        monitor_urls::table
            .find(id)
            .select(MonitorUrlRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(MonitorUrl::from))
    }

    pub async fn get_all(&self) -> Result<Vec<MonitorUrl>, DbError> {
        let mut conn = self.pool.get().await?;
        load_all(&mut conn).await
    }

    /// Insert or replace a monitored URL, including its crawl state.
    pub async fn save(&self, monitor: &MonitorUrl) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        diesel::replace_into(monitor_urls::table)
            .values(MonitorUrlRecord::from(monitor))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectorHints;
    use crate::repository::test_support::{seed_airline, setup_test_db};

    #[tokio::test]
    async fn test_selectors_and_crawl_state_persist() {
        let (ctx, _dir) = setup_test_db().await;
        let (_, monitor) = seed_airline(&ctx, "에어부산", "https://air.test/events").await;
        let repo = ctx.monitor_urls();

        let monitor = monitor.with_selectors(SelectorHints {
            list_link: Some("ul.event-list li".to_string()),
            detail_title: Some("h2.title".to_string()),
            list_period: Some(".period".to_string()),
            list_next: Some("a.next".to_string()),
        });
        repo.save(&monitor).await.unwrap();

        let checked_at = Utc::now();
        let mut conn = ctx.pool().get().await.unwrap();
        update_crawl_state(&mut conn, &monitor.id, "deadbeef", checked_at)
            .await
            .unwrap();

        let reloaded = repo.get(&monitor.id).await.unwrap().unwrap();
        assert_eq!(reloaded.selectors, monitor.selectors);
        assert_eq!(reloaded.last_html_hash.as_deref(), Some("deadbeef"));
        assert_eq!(
            reloaded.last_checked_at.map(|dt| dt.timestamp()),
            Some(checked_at.timestamp())
        );
    }
}
