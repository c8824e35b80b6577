//! Keyword persistence.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{DbError, SqliteConn, SqlitePool};
use super::records::KeywordRecord;
use crate::models::Keyword;
use crate::schema::keywords;

/// Keywords that apply to an airline: its own plus the global ones.
pub async fn for_airline(conn: &mut SqliteConn, airline_id: &str) -> Result<Vec<Keyword>, DbError> {
    keywords::table
        .filter(
            keywords::airline_id
                .eq(airline_id)
                .or(keywords::airline_id.is_null()),
        )
        .select(KeywordRecord::as_select())
        .load(conn)
        .await
        .map(|records| records.into_iter().map(Keyword::from).collect())
}

/// Keyword repository.
#[derive(Debug, Clone)]
pub struct KeywordRepository {
    pool: SqlitePool,
}

impl KeywordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, keyword: &Keyword) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        diesel::replace_into(keywords::table)
            .values(KeywordRecord::from(keyword))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    pub async fn get_all(&self) -> Result<Vec<Keyword>, DbError> {
        let mut conn = self.pool.get().await?;

        keywords::table
            .order(keywords::keyword.asc())
            .select(KeywordRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Keyword::from).collect())
    }

    /// Keywords that apply to an airline, including global ones.
    pub async fn for_airline(&self, airline_id: &str) -> Result<Vec<Keyword>, DbError> {
        let mut conn = self.pool.get().await?;
        for_airline(&mut conn, airline_id).await
    }
}
