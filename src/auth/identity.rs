//! Typed principal extraction from incoming requests.
//!
//! The token is accepted from the `Authorization: Bearer` header or the
//! `app_user` cookie; the two delivery modes are equally authoritative.
//! Claims are validated once and turned into an [`AuthUser`] that handlers
//! receive as a value, never re-derived from untyped request state.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap, StatusCode,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::error::AuthError;
use super::token::{Claims, TokenService};

/// Session cookie emitted at login.
pub const SESSION_COOKIE_NAME: &str = "app_user";

/// Authenticated user context reconstructed from validated claims.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Validate whichever token the request presented.
///
/// `Ok(None)` means no token at all; anonymous is a valid state for
/// public pages.
///
/// # Errors
///
/// Returns the token-validation error when a presented token is bad, for
/// callers that want to distinguish "bad token" from "no token".
pub fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<Option<AuthUser>, AuthError> {
    let Some(token) = extract_session_token(headers) else {
        return Ok(None);
    };

    tokens.validate(&token).map(|claims| Some(claims.into()))
}

/// Extract the request identity, treating invalid and expired tokens the
/// same as no token.
#[must_use]
pub fn identity(headers: &HeaderMap, tokens: &TokenService) -> Option<AuthUser> {
    match authenticate(headers, tokens) {
        Ok(principal) => principal,
        Err(err) => {
            debug!(error = %err, "rejected session token");
            None
        }
    }
}

/// Resolve the request identity or answer 401 for protected handlers.
///
/// # Errors
///
/// `StatusCode::UNAUTHORIZED` when no valid principal is present.
pub fn require_auth(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthUser, StatusCode> {
    identity(headers, tokens).ok_or(StatusCode::UNAUTHORIZED)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
