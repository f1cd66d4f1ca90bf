//! Login and logout endpoints.
//!
//! A successful login returns the session token in the JSON body for
//! header-based clients and sets it as an `app_user` cookie for browsers;
//! validation accepts either. Logout only clears the cookie: a stateless
//! bearer token cannot be invalidated server-side.

use axum::{
    extract::{Extension, Form},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::auth::{
    authenticate, AuthError, PasswordHasher, TokenService, SESSION_COOKIE_NAME, SESSION_TTL,
};
use crate::store::users;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful, token in body and cookie"),
        (status = 401, description = "Unknown user or wrong password"),
        (status = 500, description = "Token issuance failed")
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    tokens: Extension<Arc<TokenService>>,
    hasher: Extension<Arc<PasswordHasher>>,
    payload: Option<Form<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Form(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing credentials".to_string()).into_response();
    };

    info!(username = %request.username, "login attempt");

    let user = match users::get_by_username(&pool, &request.username).await {
        Ok(user) => user,
        Err(err) => {
            error!("failed to lookup user: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match authenticate(user.as_ref(), &request.password, &hasher, &tokens) {
        Ok(token) => {
            let mut headers = HeaderMap::new();
            if let Ok(cookie) = session_cookie(&token) {
                headers.insert(SET_COOKIE, cookie);
            }
            (StatusCode::OK, headers, Json(json!({ "token": token }))).into_response()
        }
        Err(err @ (AuthError::UserNotFound | AuthError::InvalidCredentials)) => {
            // The response never reveals which of the two happened.
            info!(username = %request.username, error = %err, "failed login attempt");
            StatusCode::UNAUTHORIZED.into_response()
        }
        Err(err) => {
            error!(username = %request.username, error = %err, "failed to issue session token");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie() {
        headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, headers).into_response()
}

/// Build the `HttpOnly`, same-site-strict cookie carrying the session token.
fn session_cookie(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = SESSION_TTL.as_secs();
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    ))
}

fn clear_session_cookie() -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("token-value").expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("app_user=token-value"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Strict"));
        assert!(value.contains("Path=/"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie().expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("app_user=;"));
        assert!(value.contains("Max-Age=0"));
    }
}
