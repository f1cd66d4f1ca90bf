//! Counter increment demo endpoint.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::error;
use utoipa::IntoParams;

use crate::store::counters;

fn default_counter() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct IncrementParams {
    /// Counter to increment.
    #[serde(default = "default_counter")]
    id: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/increment",
    params(IncrementParams),
    responses(
        (status = 200, description = "Counter incremented"),
        (status = 500, description = "Store write failed")
    ),
    tag = "counters"
)]
pub async fn increment(
    Query(params): Query<IncrementParams>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    match counters::increment(&pool, &params.id).await {
        Ok(number) => {
            (StatusCode::OK, Json(serde_json::json!({ "number": number }))).into_response()
        }
        Err(err) => {
            error!(counter = %params.id, "failed to increment counter: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
