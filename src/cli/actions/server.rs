use crate::cli::actions::Action;
use crate::{api, secrets, store};
use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use url::Url;

/// Handle the server action
///
/// # Errors
///
/// Fatal when the database is unreachable or the signing key is not
/// provisioned: the server never starts with missing secret material.
pub async fn execute(action: Action) -> Result<()> {
    let Action::Server { port, dsn, issuer } = action else {
        bail!("unexpected action");
    };

    Url::parse(&dsn).context("invalid database DSN")?;

    let pool = store::connect(&dsn).await?;
    store::ensure_schema(&pool).await?;

    let signing_key = secrets::resolve(
        &pool,
        secrets::JWT_SIGNING_KEY,
        secrets::JWT_SIGNING_KEY_PATH,
    )
    .await?;
    if signing_key.is_empty() {
        bail!("jwt signing key is not provisioned, run `plinth provision` before first start");
    }
    let signing_key = SecretString::from(signing_key);

    let cookie_key = secrets::resolve(
        &pool,
        secrets::COOKIE_ENCRYPTION_KEY,
        secrets::COOKIE_ENCRYPTION_KEY_PATH,
    )
    .await?;
    if cookie_key.is_empty() {
        bail!("cookie encryption key is not provisioned, run `plinth provision` before first start");
    }

    let issuer = issuer
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

    api::serve(port, pool, &signing_key, issuer).await
}
