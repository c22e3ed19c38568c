//! Request and response bodies that are not domain types.

use educred_core::{MetadataUri, TokenId, WalletAddress};
use educred_registry::Certificate;
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/certificates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub owner: WalletAddress,
    pub metadata_uri: MetadataUri,
}

/// Response of `GET /v1/certificates/{id}/owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerOf {
    pub token_id: TokenId,
    pub owner: WalletAddress,
}

/// Response of `GET /v1/owners/{address}/balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerBalance {
    pub owner: WalletAddress,
    pub balance: usize,
}

/// Response of `GET /v1/owners/{address}/certificates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerCertificates {
    pub owner: WalletAddress,
    pub balance: usize,
    /// In mint order.
    pub certificates: Vec<Certificate>,
}

/// Response of `GET /v1/registry/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_supply: usize,
    pub valid: usize,
    pub revoked: usize,
}
