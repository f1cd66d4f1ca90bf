//! HTTP serving boundary: router, middleware stack, and lifecycle.

use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{delete, get, post},
    Extension, Router,
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{PasswordHasher, TokenService};

pub mod handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::users::list,
        handlers::users::create,
        handlers::users::remove,
        handlers::counters::increment,
    ),
    components(schemas(
        handlers::auth::LoginRequest,
        handlers::users::CreateUserRequest,
        handlers::users::UserResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Login and logout"),
        (name = "users", description = "User administration"),
        (name = "counters", description = "Counter demo")
    )
)]
struct ApiDoc;

/// Start serving on the given port until interrupted.
///
/// The token service and password hasher are constructed once here; the
/// signing key is immutable for the server's lifetime, so rotating it
/// means restarting with a newly provisioned value.
///
/// # Errors
///
/// Returns an error when binding or serving fails.
pub async fn serve(
    port: u16,
    pool: PgPool,
    signing_key: &SecretString,
    issuer: String,
) -> Result<()> {
    let tokens = Arc::new(TokenService::new(
        signing_key.expose_secret().as_bytes(),
        issuer,
    ));
    let hasher = Arc::new(PasswordHasher::default());

    let app = router(pool, tokens, hasher);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn router(pool: PgPool, tokens: Arc<TokenService>, hasher: Arc<PasswordHasher>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/v1/users",
            get(handlers::users::list).post(handlers::users::create),
        )
        .route("/api/v1/users/:id", delete(handlers::users::remove))
        .route("/api/v1/increment", post(handlers::counters::increment))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &Request<Body>| {
                        HeaderValue::from_str(Ulid::new().to_string().as_str()).ok()
                    },
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(CorsLayer::permissive())
                .layer(Extension(tokens))
                .layer(Extension(hasher))
                .layer(Extension(pool)),
        )
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
