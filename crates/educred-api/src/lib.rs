//! # educred-api: Axum API Service
//!
//! HTTP surface for EduCred: the content-addressed metadata store, the
//! certificate registry, single and bulk issuance, and verification.
//!
//! ## Routes
//!
//! | Prefix                | Module                    |
//! |-----------------------|---------------------------|
//! | `/v1/metadata/*`      | [`routes::metadata`]      |
//! | `/v1/certificates/*`  | [`routes::certificates`]  |
//! | `/v1/owners/*`        | [`routes::owners`]        |
//! | `/v1/registry/*`      | [`routes::registry`]      |
//! | `/openapi.json`       | [`openapi`]               |
//! | `/health/*`, `/metrics` | unauthenticated         |
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer → metrics → auth → rate limit → handler
//!
//! Handlers delegate to the domain crates; every error leaves through
//! [`AppError`].

pub mod auth;
pub mod backend;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::{AppConfig, AppState};

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};

/// Headroom above the upload ceiling for JSON framing.
const BODY_LIMIT_HEADROOM: usize = 64 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health checks and `/metrics` are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let limiter = RateLimiter::new(RateLimitConfig {
        max_requests: state.config.rate_limit_per_minute,
        window_secs: 60,
    });
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(BODY_LIMIT_HEADROOM);

    // Outermost → innermost: TraceLayer → metrics → auth → rate limit → handler.
    let api = Router::new()
        .merge(routes::metadata::router())
        .merge(routes::certificates::router())
        .merge(routes::owners::router())
        .merge(routes::registry::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(limiter))
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .route("/metrics", axum::routing::get(prometheus_metrics))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// Liveness check: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: checks the database when one is configured.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }
    (StatusCode::OK, "ready").into_response()
}

/// GET /metrics: Prometheus text exposition.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => {
            metrics::gauge!("educred_certificates_total").set(state.registry.total_supply() as f64);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                handle.render(),
            )
                .into_response()
        }
        None => AppError::ServiceUnavailable("metrics recorder not installed".into()).into_response(),
    }
}
