//! # educred-client: Typed Rust client for the EduCred API
//!
//! Typed access to a running EduCred server:
//! - **Metadata** ([`MetadataClient`]): store and fetch documents and files.
//! - **Certificates** ([`CertificateClient`]): mint, issue, bulk issue,
//!   lookup, verification and revocation.
//! - **Owners** ([`OwnerClient`]): balance, holdings and per-owner
//!   verification.
//!
//! [`EduCredClient`] also implements
//! [`IssuanceBackend`](educred_issuance::IssuanceBackend), so the issuance
//! and verification workflows run unchanged against a remote server.
//!
//! ## Retry policy
//!
//! Reads and content-addressed stores retry transport failures with
//! exponential backoff. Mint, revoke, issue and bulk are sent exactly once.

pub mod backend;
pub mod certificates;
pub mod config;
pub mod error;
pub(crate) mod http;
pub mod metadata;
pub mod owners;
pub(crate) mod retry;
pub mod types;

pub use certificates::CertificateClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiErrorBody, ApiErrorDetail, ClientError};
pub use metadata::MetadataClient;
pub use owners::OwnerClient;
pub use types::{MintRequest, OwnerBalance, OwnerCertificates, OwnerOf, RegistryStats};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::http::{endpoint_url, read_json, transport_error, API_PREFIX};
use crate::retry::retry_send;

/// Header carrying the signing address when the server runs without auth.
pub const WALLET_ADDRESS_HEADER: &str = "x-wallet-address";

/// Top-level EduCred API client. Holds a sub-client per resource.
#[derive(Debug, Clone)]
pub struct EduCredClient {
    http: reqwest::Client,
    base_url: url::Url,
    timeout: Duration,
    metadata: MetadataClient,
    certificates: CertificateClient,
    owners: OwnerClient,
}

impl EduCredClient {
    /// Create a new client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ConfigError::InvalidHeader("api_token"))?,
            );
        }
        if let Some(address) = &config.wallet_address {
            headers.insert(
                WALLET_ADDRESS_HEADER,
                HeaderValue::from_str(address)
                    .map_err(|_| ConfigError::InvalidHeader("wallet_address"))?,
            );
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            metadata: MetadataClient::new(http.clone(), config.api_url.clone()),
            certificates: CertificateClient::new(http.clone(), config.api_url.clone()),
            owners: OwnerClient::new(http.clone(), config.api_url.clone()),
            http,
            base_url: config.api_url,
            timeout,
        })
    }

    /// Create a client from `EDUCRED_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn metadata(&self) -> &MetadataClient {
        &self.metadata
    }

    pub fn certificates(&self) -> &CertificateClient {
        &self.certificates
    }

    pub fn owners(&self) -> &OwnerClient {
        &self.owners
    }

    /// Per-request timeout applied by the underlying HTTP client.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Registry counters.
    ///
    /// Calls `GET {base_url}/v1/registry/stats`.
    pub async fn stats(&self) -> Result<RegistryStats, ClientError> {
        let endpoint = "GET /v1/registry/stats";
        let url = endpoint_url(&self.base_url, &format!("{API_PREFIX}/registry/stats"));
        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(transport_error(endpoint))?;
        read_json(endpoint, resp).await
    }

    /// True when the readiness check answers 200.
    ///
    /// Calls `GET {base_url}/health/readiness` once, without retry.
    pub async fn is_ready(&self) -> bool {
        let url = endpoint_url(&self.base_url, "health/readiness");
        match self.http.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "readiness check failed");
                false
            }
        }
    }
}
