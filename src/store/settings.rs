//! String-keyed settings store.
//!
//! Holds provisioned secret material (`jwt_signing_key`,
//! `cookie_encryption_key`) next to ordinary configuration values.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;

/// Read a setting, `None` when the key has never been written.
///
/// # Errors
///
/// Returns an error when the query fails.
pub async fn get_string(pool: &PgPool, key: &str) -> Result<Option<String>> {
    let query = "SELECT value FROM settings WHERE key = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(key)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to read setting")?;

    Ok(row.map(|row| row.get("value")))
}

/// Write a setting, overwriting any existing value for the key.
///
/// The upsert keeps concurrent writers safe: last writer wins, never a
/// duplicate row.
///
/// # Errors
///
/// Returns an error when the write fails.
pub async fn set_string(pool: &PgPool, key: &str, value: &str) -> Result<()> {
    let query = r"
        INSERT INTO settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(key)
        .bind(value)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to write setting")?;

    Ok(())
}
