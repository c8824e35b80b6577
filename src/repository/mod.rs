//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM over SQLite. Each table module
//! exposes connection-level functions (usable inside a transaction) and a
//! small repository type that opens its own connection.

pub mod airlines;
pub mod context;
pub mod deals;
pub mod keywords;
pub mod monitor_urls;
pub mod notices;
pub mod pool;
pub mod records;
pub mod run_locks;
pub mod util;

pub use airlines::AirlineRepository;
pub use context::{ClearReport, DbContext};
pub use deals::DealRepository;
pub use keywords::KeywordRepository;
pub use monitor_urls::MonitorUrlRepository;
pub use notices::NoticeRepository;
pub use pool::{DbError, SqliteConn, SqlitePool};

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DbContext;
    use crate::models::{Airline, MonitorUrl};

    /// Open a schema-initialized database in a temporary directory.
    pub async fn setup_test_db() -> (DbContext, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let ctx = DbContext::from_url(&db_path.display().to_string());
        ctx.init_schema().await.unwrap();
        (ctx, dir)
    }

    /// Insert an airline with one monitored URL.
    pub async fn seed_airline(ctx: &DbContext, name: &str, url: &str) -> (Airline, MonitorUrl) {
        let airline = Airline::new(name, "https://www.example-air.com");
        ctx.airlines().save(&airline).await.unwrap();
        let monitor = MonitorUrl::new(&airline.id, url);
        ctx.monitor_urls().save(&monitor).await.unwrap();
        (airline, monitor)
    }
}
