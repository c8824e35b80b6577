//! Named leases shared by every process using the database.
//!
//! A lease is a row in `run_locks`. Taking it is an insert-or-ignore, so two
//! processes racing for the same name cannot both win. A lease left behind by
//! a crashed process is reclaimed once it expires.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{DbError, SqliteConn};
use crate::schema::run_locks;

/// Fixed-width UTC timestamp, so stored expiries compare as text.
fn lease_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Try to take the lease `name` for `holder`. Returns `false` while another
/// holder's lease is still live.
pub async fn try_acquire(
    conn: &mut SqliteConn,
    name: &str,
    holder: &str,
    now: DateTime<Utc>,
    lease: Duration,
) -> Result<bool, DbError> {
    let now_str = lease_timestamp(now);

    diesel::delete(
        run_locks::table
            .filter(run_locks::name.eq(name))
            .filter(run_locks::expires_at.le(now_str.as_str())),
    )
    .execute(conn)
    .await?;

    let inserted = diesel::insert_or_ignore_into(run_locks::table)
        .values((
            run_locks::name.eq(name),
            run_locks::holder.eq(holder),
            run_locks::acquired_at.eq(now_str.as_str()),
            run_locks::expires_at.eq(lease_timestamp(now + lease)),
        ))
        .execute(conn)
        .await?;

    Ok(inserted == 1)
}

/// Give up a lease. Only the holder that took it can release it.
pub async fn release(conn: &mut SqliteConn, name: &str, holder: &str) -> Result<bool, DbError> {
    let deleted = diesel::delete(
        run_locks::table
            .filter(run_locks::name.eq(name))
            .filter(run_locks::holder.eq(holder)),
    )
    .execute(conn)
    .await?;
    Ok(deleted == 1)
}

/// Current holder of a lease, if any row exists for it.
pub async fn holder(conn: &mut SqliteConn, name: &str) -> Result<Option<String>, DbError> {
    run_locks::table
        .find(name)
        .select(run_locks::holder)
        .first(conn)
        .await
        .optional()
}
