//! Deal persistence.

use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{DbError, SqliteConn, SqlitePool};
use super::records::DealRecord;
use crate::models::{Deal, NewDeal};
use crate::schema::deals;

/// Whether any deal already references the notice.
pub async fn exists_for_notice(conn: &mut SqliteConn, notice_id: &str) -> Result<bool, DbError> {
    let count: i64 = deals::table
        .filter(deals::notice_id.eq(notice_id))
        .select(count_star())
        .first(conn)
        .await?;
    Ok(count > 0)
}

/// Insert a new deal. Callers check [`exists_for_notice`] first.
pub async fn insert(
    conn: &mut SqliteConn,
    new_deal: &NewDeal,
    now: DateTime<Utc>,
) -> Result<Deal, DbError> {
    let deal = Deal {
        id: uuid::Uuid::new_v4().to_string(),
        notice_id: Some(new_deal.notice_id.clone()),
        airline_id: new_deal.airline_id.clone(),
        title: new_deal.title.clone(),
        description: new_deal.description.clone(),
        url: new_deal.url.clone(),
        event_start: new_deal.event_start,
        event_end: new_deal.event_end,
        routes: new_deal.routes.clone(),
        price: None,
        image_url: new_deal.image_url.clone(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(deals::table)
        .values(DealRecord::from(&deal))
        .execute(conn)
        .await?;

    Ok(deal)
}

pub async fn delete_all(conn: &mut SqliteConn) -> Result<usize, DbError> {
    diesel::delete(deals::table).execute(conn).await
}

/// Deal repository.
#[derive(Debug, Clone)]
pub struct DealRepository {
    pool: SqlitePool,
}

impl DealRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All deals, newest first.
    pub async fn get_all(&self) -> Result<Vec<Deal>, DbError> {
        let mut conn = self.pool.get().await?;

        deals::table
            .order(deals::created_at.desc())
            .select(DealRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Deal::from).collect())
    }

    pub async fn get_by_notice(&self, notice_id: &str) -> Result<Vec<Deal>, DbError> {
        let mut conn = self.pool.get().await?;

        deals::table
            .filter(deals::notice_id.eq(notice_id))
            .select(DealRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Deal::from).collect())
    }
}
