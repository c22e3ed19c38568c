//! # Verification
//!
//! Reverses issuance: look the token up in the registry, dereference its
//! metadata URI, check the fetched bytes hash to the identifier in the URI,
//! and check the document's binding hash names the registered owner.
//!
//! The identifier is recomputed here from the bytes as stored rather than
//! trusting the backend's own integrity check, so a remote verifier gets the
//! same guarantee as a local one. Hashing stored bytes covers documents
//! stored in canonical form and JSON uploaded as a plain file alike.

use educred_core::{
    sha256_bytes, CertificateMetadata, ContentId, MetadataUri, Timestamp, TokenId, WalletAddress,
};
use educred_registry::Certificate;
use serde::{Deserialize, Serialize};

use crate::backend::IssuanceBackend;
use crate::error::IssuanceError;
use crate::workflow::Issuer;

/// Outcome of checking a certificate's metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetadataCheck {
    /// The token does not exist; nothing to check.
    Skipped,
    /// Document intact and bound to the registered owner.
    Verified {
        content_id: ContentId,
        document: CertificateMetadata,
    },
    /// Document intact but its binding hash names someone else.
    BindingMismatch {
        content_id: ContentId,
        document: CertificateMetadata,
    },
    /// Document could not be retrieved right now.
    Unavailable { reason: String },
    /// Document retrieved but does not match its identifier or is not a
    /// certificate document.
    IntegrityFailure { reason: String },
}

impl MetadataCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    pub fn document(&self) -> Option<&CertificateMetadata> {
        match self {
            Self::Verified { document, .. } | Self::BindingMismatch { document, .. } => {
                Some(document)
            }
            _ => None,
        }
    }
}

/// Full verification result for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub token_id: TokenId,
    pub exists: bool,
    /// Registry validity (false once revoked).
    pub is_valid: bool,
    pub owner: Option<WalletAddress>,
    pub issuer: Option<WalletAddress>,
    pub issued_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub metadata_uri: Option<MetadataUri>,
    pub metadata: MetadataCheck,
    /// Exists, valid, and metadata verified.
    pub verified: bool,
}

impl VerificationReport {
    fn missing(token_id: TokenId) -> Self {
        Self {
            token_id,
            exists: false,
            is_valid: false,
            owner: None,
            issuer: None,
            issued_at: None,
            revoked_at: None,
            metadata_uri: None,
            metadata: MetadataCheck::Skipped,
            verified: false,
        }
    }

    fn for_certificate(certificate: Certificate, metadata: MetadataCheck) -> Self {
        let is_valid = certificate.is_valid();
        Self {
            token_id: certificate.token_id,
            exists: true,
            is_valid,
            verified: is_valid && metadata.is_verified(),
            owner: Some(certificate.owner),
            issuer: Some(certificate.issuer),
            issued_at: Some(certificate.issued_at),
            revoked_at: certificate.revoked_at,
            metadata_uri: Some(certificate.metadata_uri),
            metadata,
        }
    }
}

impl<B: IssuanceBackend> Issuer<B> {
    /// Verify one token. A missing token is a report, not an error; only
    /// failures reaching the registry are errors.
    pub async fn verify_certificate(
        &self,
        token_id: TokenId,
    ) -> Result<VerificationReport, IssuanceError> {
        let Some(certificate) = self
            .bounded("certificate", self.backend.certificate(token_id))
            .await?
        else {
            return Ok(VerificationReport::missing(token_id));
        };
        let metadata = self.check_metadata(&certificate).await;
        if !metadata.is_verified() {
            tracing::debug!(token_id = %token_id, check = ?metadata, "metadata check did not pass");
        }
        Ok(VerificationReport::for_certificate(certificate, metadata))
    }

    /// Verify every certificate held by `owner`, in mint order.
    pub async fn verify_owner(
        &self,
        owner: &WalletAddress,
    ) -> Result<Vec<VerificationReport>, IssuanceError> {
        let token_ids = self
            .bounded("tokens_of", self.backend.tokens_of(owner.clone()))
            .await?;
        let mut reports = Vec::with_capacity(token_ids.len());
        for token_id in token_ids {
            reports.push(self.verify_certificate(token_id).await?);
        }
        Ok(reports)
    }

    async fn check_metadata(&self, certificate: &Certificate) -> MetadataCheck {
        let content_id = match educred_store::content_id_from_url(certificate.metadata_uri.as_str()) {
            Ok(id) => id,
            Err(e) => {
                return MetadataCheck::IntegrityFailure {
                    reason: format!("metadata URI does not name a content identifier: {e}"),
                }
            }
        };

        let bytes = match self
            .bounded("fetch_file", self.backend.fetch_file(content_id.clone()))
            .await
        {
            Ok(bytes) => bytes,
            Err(e @ IssuanceError::Integrity(_)) => {
                return MetadataCheck::IntegrityFailure {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                return MetadataCheck::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        let recomputed = ContentId::from_digest(&sha256_bytes(&bytes));
        if recomputed != content_id {
            return MetadataCheck::IntegrityFailure {
                reason: format!("document hashes to {recomputed}, expected {content_id}"),
            };
        }

        let document: CertificateMetadata = match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(e) => {
                return MetadataCheck::IntegrityFailure {
                    reason: format!("not a certificate document: {e}"),
                }
            }
        };

        if document.is_bound_to(&certificate.owner) {
            MetadataCheck::Verified {
                content_id,
                document,
            }
        } else {
            MetadataCheck::BindingMismatch {
                content_id,
                document,
            }
        }
    }
}
