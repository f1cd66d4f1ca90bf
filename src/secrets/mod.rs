//! Secret material lifecycle: provisioning and resolution.
//!
//! Secrets are generated once at deployment setup (`plinth provision`) and
//! stored in the settings table. Resolution prefers the inline settings
//! value and falls back to reading a file named by the companion `*_path`
//! key, so a secret can come from configuration or from a mounted file
//! (secret-management systems) uniformly.

use anyhow::{Context, Result};
use base64ct::{Base64, Encoding};
use rand::{rngs::OsRng, RngCore};
use sqlx::PgPool;
use tracing::warn;

use crate::store::settings;

pub const JWT_SIGNING_KEY: &str = "jwt_signing_key";
pub const JWT_SIGNING_KEY_PATH: &str = "jwt_signing_key_path";
pub const COOKIE_ENCRYPTION_KEY: &str = "cookie_encryption_key";
pub const COOKIE_ENCRYPTION_KEY_PATH: &str = "cookie_encryption_key_path";

const SECRET_LENGTH: usize = 32;

/// Generate a fresh random secret and upsert it under `key`.
///
/// Reprovisioning the same key overwrites the previous value rather than
/// duplicating the row; racing writers end with a single last-writer-wins
/// value.
///
/// # Errors
///
/// Random-source exhaustion or a store-write failure aborts provisioning;
/// there is no fallback to a weak secret.
pub async fn provision(pool: &PgPool, key: &str) -> Result<String> {
    let mut bytes = [0u8; SECRET_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to draw random secret material")?;

    let value = Base64::encode_string(&bytes);

    settings::set_string(pool, key, &value)
        .await
        .with_context(|| format!("failed to persist secret {key}"))?;

    Ok(value)
}

/// Resolve a secret: inline settings value first, then the contents of the
/// file named by `path_key`.
///
/// An empty result means "not configured"; callers decide whether that is
/// fatal.
///
/// # Errors
///
/// Returns an error when the settings store cannot be read. A missing or
/// unreadable file is not an error: it logs a warning and resolves empty.
pub async fn resolve(pool: &PgPool, primary_key: &str, path_key: &str) -> Result<String> {
    if let Some(value) = settings::get_string(pool, primary_key).await? {
        if !value.is_empty() {
            return Ok(value);
        }
    }

    let path = settings::get_string(pool, path_key)
        .await?
        .unwrap_or_default();

    Ok(read_secret_file(&path).await)
}

async fn read_secret_file(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) => {
            warn!(path, error = %err, "failed to read secret from path");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_fallback_returns_contents() {
        let path = std::env::temp_dir().join(format!("plinth-secret-{}", std::process::id()));
        std::fs::write(&path, "CERTDATA").expect("write temp secret");

        let resolved = read_secret_file(path.to_str().expect("utf-8 path")).await;
        assert_eq!(resolved, "CERTDATA");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn empty_path_resolves_empty() {
        assert_eq!(read_secret_file("").await, "");
    }

    #[tokio::test]
    async fn unreadable_path_resolves_empty() {
        assert_eq!(read_secret_file("/nonexistent/plinth-secret").await, "");
    }
}
