//! # API Route Modules
//!
//! - `metadata`: content-addressed document and file store.
//! - `certificates`: mint, issuance, bulk issuance, lookup, verification
//!   and revocation.
//! - `owners`: per-owner balance, holdings and verification.
//! - `registry`: registry counters.
//!
//! Response types here mirror the domain types' JSON exactly and exist so
//! that the OpenAPI document can describe them.

pub mod certificates;
pub mod metadata;
pub mod owners;
pub mod registry;

use educred_core::{TokenId, WalletAddress};

use crate::error::AppError;

pub(crate) fn parse_token_id(raw: &str) -> Result<TokenId, AppError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| AppError::Validation(format!("invalid token id: {raw:?}")))
        .and_then(|v| TokenId::new(v).map_err(AppError::from))
}

pub(crate) fn parse_address(raw: &str) -> Result<WalletAddress, AppError> {
    Ok(WalletAddress::new(raw)?)
}
