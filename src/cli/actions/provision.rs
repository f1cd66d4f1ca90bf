use crate::auth::PasswordHasher;
use crate::cli::actions::Action;
use crate::{secrets, store};
use anyhow::{bail, Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

/// Handle the provision action: the one-time, pre-traffic bootstrap step.
///
/// Idempotent: secrets that already hold a value are left alone unless
/// `--rotate` was given, and the default admin is only seeded into an empty
/// users table.
///
/// # Errors
///
/// Any schema, random-source, or store-write failure aborts provisioning.
pub async fn execute(action: Action) -> Result<()> {
    let Action::Provision { dsn, rotate } = action else {
        bail!("unexpected action");
    };

    let pool = store::connect(&dsn).await?;
    store::ensure_schema(&pool).await?;

    if rotate {
        warn!("rotating secrets invalidates all previously issued tokens and cookies");
    }

    ensure_secret(&pool, secrets::JWT_SIGNING_KEY, rotate).await?;
    ensure_secret(&pool, secrets::COOKIE_ENCRYPTION_KEY, rotate).await?;

    seed_default_admin(&pool).await?;

    info!("provisioning complete");

    Ok(())
}

async fn ensure_secret(pool: &PgPool, key: &str, rotate: bool) -> Result<()> {
    let current = store::settings::get_string(pool, key).await?;
    match current {
        Some(value) if !value.is_empty() && !rotate => {
            info!(key, "secret already provisioned");
        }
        _ => {
            secrets::provision(pool, key).await?;
            info!(key, "secret provisioned");
        }
    }
    Ok(())
}

async fn seed_default_admin(pool: &PgPool) -> Result<()> {
    if store::users::count(pool).await? > 0 {
        return Ok(());
    }

    let hasher = PasswordHasher::default();
    let password_hash = hasher
        .hash("admin")
        .context("failed to hash default admin password")?;

    let admin = store::users::NewUser {
        username: "admin".to_string(),
        email: "admin@localhost".to_string(),
        role: "admin".to_string(),
        password_hash,
    };

    match store::users::create(pool, &admin).await? {
        store::users::CreateOutcome::Created(user) => {
            warn!(
                username = %user.username,
                "default admin user created with password \"admin\", change it immediately"
            );
        }
        store::users::CreateOutcome::Conflict => {
            // Another provisioning run won the race; nothing to do.
        }
    }

    Ok(())
}
