//! # Middleware
//!
//! Tower layers applied to the authenticated API router:
//! TraceLayer → metrics → auth → rate limit → handler.

pub mod metrics;
pub mod rate_limit;
