//! Certificate records and the views derived from them.

use educred_core::{MetadataUri, Timestamp, TokenId, WalletAddress};
use serde::{Deserialize, Serialize};

/// Validity state of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    /// Minted and not revoked.
    Valid,
    /// Revoked. Terminal state.
    Revoked,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Revoked => "revoked",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registry entry.
///
/// Only `status` and `revoked_at` ever change after mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub token_id: TokenId,
    pub owner: WalletAddress,
    pub issuer: WalletAddress,
    pub metadata_uri: MetadataUri,
    pub issued_at: Timestamp,
    pub status: CertificateStatus,
    /// Time of the first revoke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
}

impl Certificate {
    pub fn is_valid(&self) -> bool {
        self.status == CertificateStatus::Valid
    }

    pub fn info(&self) -> CertificateInfo {
        CertificateInfo {
            issuer: self.issuer.clone(),
            metadata_uri: self.metadata_uri.clone(),
            issued_at: self.issued_at,
            is_valid: self.is_valid(),
        }
    }

    pub fn verification(&self) -> Verification {
        Verification {
            exists: true,
            is_valid: self.is_valid(),
            owner: Some(self.owner.clone()),
            issuer: Some(self.issuer.clone()),
            issued_at: Some(self.issued_at),
        }
    }
}

/// Issuer-side data for a token: what `certificate_data` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub issuer: WalletAddress,
    pub metadata_uri: MetadataUri,
    pub issued_at: Timestamp,
    pub is_valid: bool,
}

/// Outcome of `verify`. A missing token is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub exists: bool,
    pub is_valid: bool,
    pub owner: Option<WalletAddress>,
    pub issuer: Option<WalletAddress>,
    pub issued_at: Option<Timestamp>,
}

impl Verification {
    /// The result for a token id that was never minted.
    pub fn missing() -> Self {
        Self {
            exists: false,
            is_valid: false,
            owner: None,
            issuer: None,
            issued_at: None,
        }
    }
}

/// Result of a revoke call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    /// The record after the call.
    pub certificate: Certificate,
    /// False when the certificate was already revoked.
    pub newly_revoked: bool,
}
