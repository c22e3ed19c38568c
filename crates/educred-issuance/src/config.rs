//! Issuance workflow configuration.

use std::time::Duration;

/// Timeouts and bulk pacing for the issuance workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceConfig {
    /// Upper bound on each backend call (store, mint, lookups).
    pub call_timeout: Duration,
    /// Rows issued concurrently during bulk issuance. `1` is sequential.
    pub bulk_concurrency: usize,
    /// Pause after each sequential bulk row.
    pub inter_row_delay: Duration,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_millis(10_000),
            bulk_concurrency: 1,
            inter_row_delay: Duration::ZERO,
        }
    }
}

impl IssuanceConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `EDUCRED_CALL_TIMEOUT_MS` (default: 10000)
    /// - `EDUCRED_BULK_CONCURRENCY` (default: 1, minimum 1)
    /// - `EDUCRED_BULK_DELAY_MS` (default: 0)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            call_timeout: env_u64("EDUCRED_CALL_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.call_timeout),
            bulk_concurrency: env_u64("EDUCRED_BULK_CONCURRENCY")
                .map(|n| n.max(1) as usize)
                .unwrap_or(defaults.bulk_concurrency),
            inter_row_delay: env_u64("EDUCRED_BULK_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.inter_row_delay),
        }
    }
}

fn env_u64(var: &str) -> Option<u64> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}
