//! # Prometheus Metrics
//!
//! Request counters and latency histograms recorded through the `metrics`
//! facade. `main` installs a Prometheus recorder and `/metrics` renders it;
//! without a recorder the macros are no-ops.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Count every request by method, matched route and status, and record
/// its latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    ::metrics::histogram!(
        "educred_http_request_duration_seconds",
        "method" => method.clone(),
        "route" => route.clone()
    )
    .record(start.elapsed().as_secs_f64());
    ::metrics::counter!(
        "educred_http_requests_total",
        "method" => method,
        "route" => route,
        "status" => status
    )
    .increment(1);
    if response.status().is_server_error() {
        ::metrics::counter!("educred_http_server_errors_total").increment(1);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn passes_response_through_without_recorder() {
        let app = Router::new()
            .route("/x", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(from_fn(metrics_middleware));
        let resp = app
            .oneshot(Request::builder().uri("/x").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    }
}
