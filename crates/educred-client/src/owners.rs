//! Typed client for the per-owner endpoints.

use educred_core::WalletAddress;
use educred_issuance::VerificationReport;

use crate::error::ClientError;
use crate::http::{endpoint_url, read_json, transport_error, API_PREFIX};
use crate::retry::retry_send;
use crate::types::{OwnerBalance, OwnerCertificates};

/// Client for `/v1/owners/{address}/*`.
#[derive(Debug, Clone)]
pub struct OwnerClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl OwnerClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        owner: &WalletAddress,
        resource: &str,
    ) -> Result<T, ClientError> {
        let endpoint = format!("GET /v1/owners/{owner}/{resource}");
        let url = endpoint_url(
            &self.base_url,
            &format!("{API_PREFIX}/owners/{owner}/{resource}"),
        );
        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(transport_error(&endpoint))?;
        read_json(&endpoint, resp).await
    }

    /// Number of certificates held, revoked included.
    ///
    /// Calls `GET {base_url}/v1/owners/{address}/balance`.
    pub async fn balance(&self, owner: &WalletAddress) -> Result<usize, ClientError> {
        let balance: OwnerBalance = self.get(owner, "balance").await?;
        Ok(balance.balance)
    }

    /// Every certificate held, in mint order.
    ///
    /// Calls `GET {base_url}/v1/owners/{address}/certificates`.
    pub async fn certificates(
        &self,
        owner: &WalletAddress,
    ) -> Result<OwnerCertificates, ClientError> {
        self.get(owner, "certificates").await
    }

    /// Server-side verification of every certificate held.
    ///
    /// Calls `GET {base_url}/v1/owners/{address}/verify`.
    pub async fn verify(&self, owner: &WalletAddress) -> Result<Vec<VerificationReport>, ClientError> {
        self.get(owner, "verify").await
    }
}
