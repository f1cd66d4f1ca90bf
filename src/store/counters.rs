//! Named counters for the increment demo endpoint.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;

/// Increment a counter, creating it at 1 on first use, and return the new
/// value. The upsert makes concurrent increments race-safe.
///
/// # Errors
///
/// Returns an error when the write fails.
pub async fn increment(pool: &PgPool, id: &str) -> Result<i64> {
    let query = r"
        INSERT INTO counters (id, value)
        VALUES ($1, 1)
        ON CONFLICT (id) DO UPDATE SET value = counters.value + 1
        RETURNING value
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to increment counter")?;

    Ok(row.get("value"))
}
