//! # CLI Configuration
//!
//! Connection settings come from three layers, highest precedence first:
//! command-line flags (or their `EDUCRED_*` environment variables), the
//! YAML file named by `--config`, and the client defaults.
//!
//! ```yaml
//! api_url: https://educred.example.org
//! api_token: "issuer:0x…:secret"
//! wallet_address: "0x…"
//! timeout_secs: 30
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use educred_client::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use educred_client::ClientConfig;
use serde::Deserialize;

/// Contents of a `--config` file. Every key is optional.
#[derive(Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub wallet_address: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("wallet_address", &self.wallet_address)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl CliConfig {
    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }
}

/// Connection flags shared by every subcommand that talks to a server.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Base URL of the EduCred API.
    #[arg(long, env = "EDUCRED_API_URL", global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token: `{secret}` or `{role}:{address}:{secret}`.
    #[arg(
        long,
        env = "EDUCRED_API_TOKEN",
        global = true,
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub api_token: Option<String>,

    /// Signing address sent as `X-Wallet-Address` to servers without auth.
    #[arg(long, env = "EDUCRED_WALLET_ADDRESS", global = true, value_name = "ADDRESS")]
    pub wallet_address: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "EDUCRED_TIMEOUT_SECS", global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

/// Merge flags over the file over defaults.
pub fn resolve(flags: &ConnectionArgs, file: &CliConfig) -> Result<ClientConfig> {
    let api_url = flags
        .api_url
        .as_deref()
        .or(file.api_url.as_deref())
        .unwrap_or(DEFAULT_API_URL);
    let mut config = ClientConfig::new(api_url).context("invalid API URL")?;

    if let Some(token) = non_empty(flags.api_token.as_ref().or(file.api_token.as_ref())) {
        config = config.with_token(token);
    }
    if let Some(address) = non_empty(flags.wallet_address.as_ref().or(file.wallet_address.as_ref()))
    {
        config = config.with_wallet_address(address);
    }
    let timeout = flags
        .timeout_secs
        .or(file.timeout_secs)
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Ok(config.with_timeout_secs(timeout))
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
