//! Notice persistence.

use std::collections::HashSet;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{DbError, SqliteConn, SqlitePool};
use super::records::NoticeRecord;
use super::util::routes_to_json;
use crate::models::Notice;
use crate::schema::notices;

pub async fn insert(conn: &mut SqliteConn, notice: &Notice) -> Result<(), DbError> {
    diesel::insert_into(notices::table)
        .values(NoticeRecord::from(notice))
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn find(conn: &mut SqliteConn, id: &str) -> Result<Option<Notice>, DbError> {
    notices::table
        .find(id)
        .select(NoticeRecord::as_select())
        .first(conn)
        .await
        .optional()
        .map(|opt| opt.map(Notice::from))
}

/// Persist the fields the classifier is allowed to change.
pub async fn save_analysis(conn: &mut SqliteConn, notice: &Notice) -> Result<(), DbError> {
    diesel::update(notices::table.find(&notice.id))
        .set((
            notices::extracted_text.eq(&notice.extracted_text),
            notices::event_start.eq(notice.event_start.map(|dt| dt.to_rfc3339())),
            notices::event_end.eq(notice.event_end.map(|dt| dt.to_rfc3339())),
            notices::routes.eq(routes_to_json(&notice.routes)),
            notices::is_special_deal.eq(notice.is_special_deal),
            notices::analyzed_at.eq(notice.analyzed_at.map(|dt| dt.to_rfc3339())),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

/// Source URLs already recorded for an airline.
pub async fn source_urls_for_airline(
    conn: &mut SqliteConn,
    airline_id: &str,
) -> Result<HashSet<String>, DbError> {
    let urls: Vec<String> = notices::table
        .filter(notices::airline_id.eq(airline_id))
        .select(notices::source_url)
        .load(conn)
        .await?;
    Ok(urls.into_iter().collect())
}

pub async fn delete_all(conn: &mut SqliteConn) -> Result<usize, DbError> {
    diesel::delete(notices::table).execute(conn).await
}

/// Notice repository.
#[derive(Debug, Clone)]
pub struct NoticeRepository {
    pool: SqlitePool,
}

impl NoticeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Notice>, DbError> {
        let mut conn = self.pool.get().await?;
        find(&mut conn, id).await
    }

    pub async fn insert(&self, notice: &Notice) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        insert(&mut conn, notice).await
    }

    /// Notices of one airline, newest first.
    pub async fn get_by_airline(&self, airline_id: &str) -> Result<Vec<Notice>, DbError> {
        let mut conn = self.pool.get().await?;

        notices::table
            .filter(notices::airline_id.eq(airline_id))
            .order(notices::created_at.desc())
            .select(NoticeRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Notice::from).collect())
    }

    pub async fn known_source_urls(&self, airline_id: &str) -> Result<HashSet<String>, DbError> {
        let mut conn = self.pool.get().await?;
        source_urls_for_airline(&mut conn, airline_id).await
    }
}
