//! [`IssuanceBackend`] over HTTP.
//!
//! Lets [`Issuer`](educred_issuance::Issuer) drive a remote server: the
//! document is stored and minted through the API, and verification
//! recomputes content identifiers locally from the fetched documents.

use educred_core::{ContentId, MetadataUri, TokenId, WalletAddress};
use educred_issuance::{IssuanceBackend, IssuanceError};
use educred_registry::Certificate;
use educred_store::StoredObject;

use crate::error::ClientError;
use crate::types::MintRequest;
use crate::EduCredClient;

impl EduCredClient {
    /// Map a client failure onto the issuance taxonomy, keeping transport
    /// and timeout failures retryable.
    pub fn issuance_error(&self, operation: &'static str, err: ClientError) -> IssuanceError {
        if err.is_timeout() {
            return IssuanceError::Timeout {
                operation,
                after: self.timeout(),
            };
        }
        match err {
            ClientError::Http { .. } => IssuanceError::Network(err.to_string()),
            ClientError::ApiError { status, .. } => {
                let detail = err.api_error();
                let message = detail
                    .as_ref()
                    .map(|d| d.message.clone())
                    .unwrap_or_else(|| err.to_string());
                match (status, detail.as_ref().map(|d| d.code.as_str())) {
                    (_, Some("INTEGRITY_ERROR")) => IssuanceError::Integrity(message),
                    (404, _) => IssuanceError::NotFound(message),
                    (413, _) => {
                        let size_limit = detail.as_ref().and_then(|d| d.details.as_ref());
                        let field = |name: &str| {
                            size_limit
                                .and_then(|v| v.get(name))
                                .and_then(serde_json::Value::as_u64)
                                .unwrap_or(0) as usize
                        };
                        IssuanceError::PayloadTooLarge {
                            size: field("size"),
                            limit: field("limit"),
                        }
                    }
                    (422, _) => IssuanceError::Validation(message),
                    (428, _) => IssuanceError::NotInitialized(message),
                    (504, _) => IssuanceError::Timeout {
                        operation,
                        after: self.timeout(),
                    },
                    (502 | 503, _) => IssuanceError::Network(message),
                    _ => IssuanceError::Storage(message),
                }
            }
            ClientError::Deserialization { .. } | ClientError::Config(_) => {
                IssuanceError::Storage(err.to_string())
            }
        }
    }
}

impl IssuanceBackend for EduCredClient {
    async fn store_document(
        &self,
        document: serde_json::Value,
    ) -> Result<StoredObject, IssuanceError> {
        self.metadata()
            .store_document(&document)
            .await
            .map_err(|e| self.issuance_error("store_document", e))
    }

    async fn mint(
        &self,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> Result<Certificate, IssuanceError> {
        self.certificates()
            .mint(&MintRequest {
                owner,
                metadata_uri,
            })
            .await
            .map_err(|e| self.issuance_error("mint", e))
    }

    async fn fetch_file(&self, id: ContentId) -> Result<Vec<u8>, IssuanceError> {
        self.metadata()
            .fetch_file(&id)
            .await
            .map_err(|e| self.issuance_error("fetch_file", e))?
            .ok_or_else(|| IssuanceError::NotFound(format!("metadata {id}")))
    }

    async fn certificate(&self, token_id: TokenId) -> Result<Option<Certificate>, IssuanceError> {
        self.certificates()
            .get(token_id)
            .await
            .map_err(|e| self.issuance_error("certificate", e))
    }

    async fn tokens_of(&self, owner: WalletAddress) -> Result<Vec<TokenId>, IssuanceError> {
        let holdings = self
            .owners()
            .certificates(&owner)
            .await
            .map_err(|e| self.issuance_error("tokens_of", e))?;
        Ok(holdings.certificates.iter().map(|c| c.token_id).collect())
    }
}
