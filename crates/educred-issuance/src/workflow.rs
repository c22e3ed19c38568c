//! # Single-Certificate Issuance
//!
//! ```text
//! validate ──► build + bind document ──► store_document ──► mint ──► receipt
//! ```
//!
//! Validation failures make no backend call. A store failure never reaches
//! mint. A mint failure leaves the stored document orphaned; the document is
//! content-addressed and harmless, so there is no compensating delete.

use std::future::Future;

use educred_core::{CertificateMetadata, ContentId, MetadataUri, Timestamp, TokenId, WalletAddress};
use serde::{Deserialize, Serialize};

use crate::backend::IssuanceBackend;
use crate::config::IssuanceConfig;
use crate::error::IssuanceError;
use crate::request::IssueRequest;

/// What a successful issuance returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceReceipt {
    pub token_id: TokenId,
    pub owner: WalletAddress,
    pub issuer: WalletAddress,
    pub metadata_id: ContentId,
    pub metadata_uri: MetadataUri,
    /// `0x`-prefixed binding hash written into the document.
    pub certificate_hash: String,
    pub issued_at: Timestamp,
}

/// Runs issuance and verification against a backend.
#[derive(Debug, Clone)]
pub struct Issuer<B> {
    pub(crate) backend: B,
    pub(crate) config: IssuanceConfig,
}

impl<B: IssuanceBackend> Issuer<B> {
    pub fn new(backend: B, config: IssuanceConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &IssuanceConfig {
        &self.config
    }

    /// Issue one certificate.
    pub async fn issue(&self, request: &IssueRequest) -> Result<IssuanceReceipt, IssuanceError> {
        let (recipient, data) = request.validate()?;
        let document =
            CertificateMetadata::for_completion(data, request.image.clone()).bind(&recipient)?;
        let certificate_hash = document.certificate_data.certificate_hash.clone();
        let value = serde_json::to_value(&document)
            .map_err(|e| IssuanceError::Validation(format!("metadata document: {e}")))?;

        let stored = self
            .bounded("store_document", self.backend.store_document(value))
            .await?;
        let metadata_uri = MetadataUri::new(stored.url.clone())?;

        let certificate = match self
            .bounded("mint", self.backend.mint(recipient.clone(), metadata_uri.clone()))
            .await
        {
            Ok(certificate) => certificate,
            Err(e) => {
                tracing::warn!(
                    metadata_id = %stored.id,
                    recipient = %recipient,
                    error = %e,
                    "mint failed; stored metadata document is orphaned"
                );
                return Err(e);
            }
        };

        tracing::info!(
            token_id = %certificate.token_id,
            owner = %certificate.owner,
            metadata_id = %stored.id,
            "certificate issued"
        );
        Ok(IssuanceReceipt {
            token_id: certificate.token_id,
            owner: certificate.owner,
            issuer: certificate.issuer,
            metadata_id: stored.id,
            metadata_uri,
            certificate_hash,
            issued_at: certificate.issued_at,
        })
    }

    /// Await a backend call, failing with `Timeout` after the configured bound.
    pub(crate) async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, IssuanceError>>,
    ) -> Result<T, IssuanceError> {
        let after = self.config.call_timeout;
        match tokio::time::timeout(after, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, timeout_ms = after.as_millis() as u64, "backend call timed out");
                Err(IssuanceError::Timeout { operation, after })
            }
        }
    }
}
