//! Typed client for the certificate registry and issuance endpoints.
//!
//! | Method | Path | Operation | Retried |
//! |--------|------|-----------|---------|
//! | POST   | `/v1/certificates` | Mint | no |
//! | POST   | `/v1/certificates/issue` | Issue one certificate | no |
//! | POST   | `/v1/certificates/bulk` | Bulk issue from CSV | no |
//! | GET    | `/v1/certificates/{id}` | Certificate record | yes |
//! | GET    | `/v1/certificates/{id}/owner` | Owner | yes |
//! | GET    | `/v1/certificates/{id}/verify` | Registry verification | yes |
//! | GET    | `/v1/certificates/{id}/report` | Full verification | yes |
//! | POST   | `/v1/certificates/{id}/revoke` | Revoke | no |

use educred_core::{TokenId, WalletAddress};
use educred_issuance::{BulkReport, IssuanceReceipt, IssueRequest, VerificationReport};
use educred_registry::{Certificate, Revocation, Verification};

use crate::error::ClientError;
use crate::http::{endpoint_url, read_json, read_optional_json, transport_error, API_PREFIX};
use crate::retry::retry_send;
use crate::types::{MintRequest, OwnerOf};

/// Client for the certificate API.
#[derive(Debug, Clone)]
pub struct CertificateClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl CertificateClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, &format!("{API_PREFIX}/certificates{path}"))
    }

    /// Mint a certificate as the caller's signing identity. Sent once.
    ///
    /// Calls `POST {base_url}/v1/certificates`.
    pub async fn mint(&self, req: &MintRequest) -> Result<Certificate, ClientError> {
        let endpoint = "POST /v1/certificates";
        let resp = self
            .http
            .post(self.url(""))
            .json(req)
            .send()
            .await
            .map_err(transport_error(endpoint))?;
        read_json(endpoint, resp).await
    }

    /// Run the server-side issuance workflow. Sent once.
    ///
    /// Calls `POST {base_url}/v1/certificates/issue`.
    pub async fn issue(&self, req: &IssueRequest) -> Result<IssuanceReceipt, ClientError> {
        let endpoint = "POST /v1/certificates/issue";
        let resp = self
            .http
            .post(self.url("/issue"))
            .json(req)
            .send()
            .await
            .map_err(transport_error(endpoint))?;
        read_json(endpoint, resp).await
    }

    /// Submit CSV text for bulk issuance. Sent once.
    ///
    /// Calls `POST {base_url}/v1/certificates/bulk`.
    pub async fn bulk(&self, csv: impl Into<String>) -> Result<BulkReport, ClientError> {
        let endpoint = "POST /v1/certificates/bulk";
        let resp = self
            .http
            .post(self.url("/bulk"))
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(csv.into())
            .send()
            .await
            .map_err(transport_error(endpoint))?;
        read_json(endpoint, resp).await
    }

    /// Full registry record, or `None` if the token was never minted.
    ///
    /// Calls `GET {base_url}/v1/certificates/{id}`.
    pub async fn get(&self, token_id: TokenId) -> Result<Option<Certificate>, ClientError> {
        let endpoint = format!("GET /v1/certificates/{token_id}");
        let url = self.url(&format!("/{token_id}"));
        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(transport_error(&endpoint))?;
        read_optional_json(&endpoint, resp).await
    }

    /// Owner of a token, or `None` if the token was never minted.
    ///
    /// Calls `GET {base_url}/v1/certificates/{id}/owner`.
    pub async fn owner_of(&self, token_id: TokenId) -> Result<Option<WalletAddress>, ClientError> {
        let endpoint = format!("GET /v1/certificates/{token_id}/owner");
        let url = self.url(&format!("/{token_id}/owner"));
        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(transport_error(&endpoint))?;
        let owner: Option<OwnerOf> = read_optional_json(&endpoint, resp).await?;
        Ok(owner.map(|o| o.owner))
    }

    /// Registry verification. A missing token is `exists: false`.
    ///
    /// Calls `GET {base_url}/v1/certificates/{id}/verify`.
    pub async fn verify(&self, token_id: TokenId) -> Result<Verification, ClientError> {
        let endpoint = format!("GET /v1/certificates/{token_id}/verify");
        let url = self.url(&format!("/{token_id}/verify"));
        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(transport_error(&endpoint))?;
        read_json(&endpoint, resp).await
    }

    /// Server-side verification including metadata integrity and binding.
    ///
    /// Calls `GET {base_url}/v1/certificates/{id}/report`.
    pub async fn report(&self, token_id: TokenId) -> Result<VerificationReport, ClientError> {
        let endpoint = format!("GET /v1/certificates/{token_id}/report");
        let url = self.url(&format!("/{token_id}/report"));
        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(transport_error(&endpoint))?;
        read_json(&endpoint, resp).await
    }

    /// Revoke a certificate. Sent once.
    ///
    /// Calls `POST {base_url}/v1/certificates/{id}/revoke`.
    pub async fn revoke(&self, token_id: TokenId) -> Result<Revocation, ClientError> {
        let endpoint = format!("POST /v1/certificates/{token_id}/revoke");
        let resp = self
            .http
            .post(self.url(&format!("/{token_id}/revoke")))
            .send()
            .await
            .map_err(transport_error(&endpoint))?;
        read_json(&endpoint, resp).await
    }
}
