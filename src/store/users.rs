//! User records and lookups.
//!
//! The password hash column stores the `"<salt>:<key>"` encoding produced by
//! [`crate::auth::PasswordHasher`]; plaintext passwords never reach this
//! module.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
}

/// Fields required to insert a user; the id is generated on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
}

/// Outcome when attempting to create a user.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(User),
    Conflict,
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        role: row.get("role"),
        password_hash: row.get("password_hash"),
    }
}

/// Look up a user by username.
///
/// # Errors
///
/// Returns an error when the query fails; an unknown username is `None`.
pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let query =
        "SELECT id, username, email, role, password_hash FROM users WHERE username = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by username")?;

    Ok(row.as_ref().map(user_from_row))
}

/// Look up a user by id.
///
/// # Errors
///
/// Returns an error when the query fails; an unknown id is `None`.
pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let query = "SELECT id, username, email, role, password_hash FROM users WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by id")?;

    Ok(row.as_ref().map(user_from_row))
}

/// List all users.
///
/// # Errors
///
/// Returns an error when the query fails.
pub async fn list(pool: &PgPool) -> Result<Vec<User>> {
    let query = "SELECT id, username, email, role, password_hash FROM users ORDER BY username";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list users")?;

    Ok(rows.iter().map(user_from_row).collect())
}

/// Count stored users.
///
/// # Errors
///
/// Returns an error when the query fails.
pub async fn count(pool: &PgPool) -> Result<i64> {
    let query = "SELECT COUNT(*) AS total FROM users";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to count users")?;

    Ok(row.get("total"))
}

/// Insert a user, reporting a conflict when the username is taken.
///
/// # Errors
///
/// Returns an error when the insert fails for any reason other than a
/// unique violation.
pub async fn create(pool: &PgPool, new_user: &NewUser) -> Result<CreateOutcome> {
    let query = r"
        INSERT INTO users (id, username, email, role, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, username, email, role, password_hash
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.role)
        .bind(&new_user.password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(CreateOutcome::Created(user_from_row(&row))),
        Err(err) if super::is_unique_violation(&err) => Ok(CreateOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// Delete a user by id; `false` when no row matched.
///
/// # Errors
///
/// Returns an error when the delete fails.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
    let query = "DELETE FROM users WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete user")?;

    Ok(result.rows_affected() > 0)
}
