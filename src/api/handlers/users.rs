//! User administration endpoints. All of them require an authenticated
//! principal; password hashes never leave this module.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_auth, PasswordHasher, TokenService};
use crate::store::users::{self, CreateOutcome, NewUser, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    username: String,
    email: String,
    password: String,
    confirm_password: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    id: Uuid,
    username: String,
    email: String,
    role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 401, description = "Not authenticated")
    ),
    tag = "users"
)]
pub async fn list(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    tokens: Extension<Arc<TokenService>>,
) -> impl IntoResponse {
    if let Err(status) = require_auth(&headers, &tokens) {
        return status.into_response();
    }

    match users::list(&pool).await {
        Ok(all) => {
            let body: Vec<UserResponse> = all.into_iter().map(UserResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!("failed to list users: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Username already taken")
    ),
    tag = "users"
)]
pub async fn create(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    tokens: Extension<Arc<TokenService>>,
    hasher: Extension<Arc<PasswordHasher>>,
    payload: Option<Json<CreateUserRequest>>,
) -> impl IntoResponse {
    if let Err(status) = require_auth(&headers, &tokens) {
        return status.into_response();
    }

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if let Err(message) = validate_create_request(&request) {
        return (StatusCode::BAD_REQUEST, message.to_string()).into_response();
    }

    let password_hash = match hasher.hash(&request.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("failed to hash password: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let new_user = NewUser {
        username: request.username,
        email: request.email,
        role: request.role.unwrap_or_else(|| "user".to_string()),
        password_hash,
    };

    match users::create(&pool, &new_user).await {
        Ok(CreateOutcome::Created(user)) => {
            (StatusCode::CREATED, Json(UserResponse::from(user))).into_response()
        }
        Ok(CreateOutcome::Conflict) => {
            (StatusCode::CONFLICT, "Username already taken".to_string()).into_response()
        }
        Err(err) => {
            error!("failed to create user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown user id")
    ),
    tag = "users"
)]
pub async fn remove(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    pool: Extension<PgPool>,
    tokens: Extension<Arc<TokenService>>,
) -> impl IntoResponse {
    if let Err(status) = require_auth(&headers, &tokens) {
        return status.into_response();
    }

    match users::delete(&pool, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("failed to delete user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn validate_create_request(request: &CreateUserRequest) -> Result<(), &'static str> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
        || request.confirm_password.is_empty()
    {
        return Err("username, email and password are required");
    }
    if request.password != request.confirm_password {
        return Err("passwords do not match");
    }
    if !valid_email(request.email.trim()) {
        return Err("invalid email address");
    }
    Ok(())
}

/// Basic email format check.
fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateUserRequest {
        CreateUserRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "wonderland".to_string(),
            confirm_password: "wonderland".to_string(),
            role: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_create_request(&request()).is_ok());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let mut bad = request();
        bad.username = String::new();
        assert!(validate_create_request(&bad).is_err());

        let mut bad = request();
        bad.password = String::new();
        assert!(validate_create_request(&bad).is_err());
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut bad = request();
        bad.confirm_password = "other".to_string();
        assert!(validate_create_request(&bad).is_err());
    }

    #[test]
    fn email_format_is_checked() {
        assert!(valid_email("admin@localhost"));
        assert!(valid_email("a@example.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("spaces in@mail"));
    }
}
