//! # Per-Caller Rate Limiting
//!
//! Fixed-window limiter keyed by the caller's signing address, or
//! `"anonymous"` for callers without one. In-memory, per process. Expired
//! windows are swept at most once per window length, so memory tracks the
//! callers seen recently rather than every caller ever seen.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;

use crate::auth::CallerIdentity;
use crate::error::ErrorBody;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 1000,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
struct BucketState {
    count: u64,
    window_start: Instant,
}

#[derive(Debug)]
struct Buckets {
    by_key: HashMap<String, BucketState>,
    last_sweep: Instant,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<Buckets>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(Buckets {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    fn expired(&self, window_start: Instant, now: Instant) -> bool {
        now.duration_since(window_start).as_secs() >= self.config.window_secs
    }

    /// Count a request against `key`; false once the window is exhausted.
    fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock();
        let now = Instant::now();

        if self.expired(buckets.last_sweep, now) {
            buckets
                .by_key
                .retain(|_, bucket| !self.expired(bucket.window_start, now));
            buckets.last_sweep = now;
        }

        let bucket = buckets.by_key.entry(key.to_string()).or_insert(BucketState {
            count: 0,
            window_start: now,
        });

        if self.expired(bucket.window_start, now) {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.config.max_requests {
            false
        } else {
            bucket.count += 1;
            true
        }
    }
}

/// Middleware that enforces per-caller rate limits.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        let key = request
            .extensions()
            .get::<CallerIdentity>()
            .and_then(|c| c.address.as_ref())
            .map(|a| a.as_str().to_ascii_lowercase())
            .unwrap_or_else(|| "anonymous".to_string());

        if !limiter.check(&key) {
            tracing::warn!(key = %key, "rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorBody::new("RATE_LIMITED", "rate limit exceeded")),
            )
                .into_response();
        }
    }

    next.run(request).await
}
