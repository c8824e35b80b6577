//! Airline persistence.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{DbError, SqliteConn, SqlitePool};
use super::records::AirlineRecord;
use crate::models::Airline;
use crate::schema::airlines;

/// Look up an airline by id on an existing connection.
pub async fn find(conn: &mut SqliteConn, id: &str) -> Result<Option<Airline>, DbError> {
    airlines::table
        .find(id)
        .select(AirlineRecord::as_select())
        .first(conn)
        .await
        .optional()
        .map(|opt| opt.map(Airline::from))
}

/// Airline repository.
#[derive(Debug, Clone)]
pub struct AirlineRepository {
    pool: SqlitePool,
}

impl AirlineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an airline by ID.
    pub async fn get(&self, id: &str) -> Result<Option<Airline>, DbError> {
        let mut conn = self.pool.get().await?;
        find(&mut conn, id).await
    }

    /// Get all airlines ordered by name.
    pub async fn get_all(&self) -> Result<Vec<Airline>, DbError> {
        let mut conn = self.pool.get().await?;

        airlines::table
            .order(airlines::name.asc())
            .select(AirlineRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Airline::from).collect())
    }

    /// Insert or replace an airline.
    pub async fn save(&self, airline: &Airline) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        diesel::replace_into(airlines::table)
            .values(AirlineRecord::from(airline))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Delete an airline and, through the foreign keys, everything it owns.
    pub async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(airlines::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }
}
