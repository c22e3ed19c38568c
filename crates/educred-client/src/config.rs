//! EduCred API client configuration.
//!
//! Defaults point at a local server. Override via environment variables or
//! explicit construction.

use url::Url;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to an EduCred API server.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the API server.
    pub api_url: Url,
    /// Bearer token. `None` when the server runs without auth.
    pub api_token: Option<String>,
    /// Signing address sent as `X-Wallet-Address` for servers without auth.
    pub wallet_address: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("wallet_address", &self.wallet_address)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration for `api_url` with no credentials and the default timeout.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_url("api_url", api_url)?,
            api_token: None,
            wallet_address: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `EDUCRED_API_URL` (default: `http://127.0.0.1:8080`)
    /// - `EDUCRED_API_TOKEN` (optional)
    /// - `EDUCRED_WALLET_ADDRESS` (optional)
    /// - `EDUCRED_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: env_url("EDUCRED_API_URL", DEFAULT_API_URL)?,
            api_token: non_empty_var("EDUCRED_API_TOKEN"),
            wallet_address: non_empty_var("EDUCRED_WALLET_ADDRESS"),
            timeout_secs: std::env::var("EDUCRED_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_wallet_address(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            name.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    Ok(url)
}

fn non_empty_var(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let cfg = ClientConfig::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(cfg.api_token.is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = ClientConfig::new(DEFAULT_API_URL)
            .unwrap()
            .with_token("super-secret");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("EDUCRED_NONEXISTENT_VAR_12345", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(ClientConfig::new("not a url").is_err());
        assert!(ClientConfig::new("mailto:someone@example.com").is_err());
    }
}
