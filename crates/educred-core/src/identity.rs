//! # Identity Newtypes
//!
//! Validated wrappers for the identifiers that cross the registry boundary:
//! wallet addresses, token ids and metadata URIs.
//!
//! Each newtype validates at construction and at deserialization, so a value
//! held in one of these types is always well-formed.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum accepted metadata URI length.
pub const MAX_URI_LEN: usize = 2048;

// ---------------------------------------------------------------------------
// WalletAddress
// ---------------------------------------------------------------------------

/// An account address: `0x` followed by 40 hex digits.
///
/// Addresses compare case-insensitively. The stored form is lowercase, so
/// derived `Eq` and `Hash` already give case-insensitive semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate and normalize an address.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ValidationError> {
        let s = s.as_ref();
        let hex = s
            .strip_prefix("0x")
            .ok_or_else(|| ValidationError::InvalidWalletAddress(s.to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidWalletAddress(s.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// Lowercase `0x…` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WalletAddress> for String {
    fn from(addr: WalletAddress) -> Self {
        addr.0
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// A certificate token id. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TokenId(u64);

impl TokenId {
    /// The first id the registry hands out.
    pub const FIRST: TokenId = TokenId(1);

    /// Validate a raw id.
    pub fn new(value: u64) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::InvalidTokenId("0".to_string()));
        }
        Ok(Self(value))
    }

    /// The raw integer value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(&self) -> TokenId {
        TokenId(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidTokenId(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<u64> for TokenId {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TokenId> for u64 {
    fn from(id: TokenId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// MetadataUri
// ---------------------------------------------------------------------------

/// A reference into the metadata store, e.g. `ipfs://Qm…`.
///
/// The registry stores this opaquely; it does not require the URI to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetadataUri(String);

impl MetadataUri {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ValidationError::InvalidMetadataUri("empty".to_string()));
        }
        if s.len() > MAX_URI_LEN {
            return Err(ValidationError::InvalidMetadataUri(format!(
                "longer than {MAX_URI_LEN} bytes"
            )));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidMetadataUri(format!(
                "contains whitespace: {s:?}"
            )));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MetadataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MetadataUri {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MetadataUri> for String {
    fn from(uri: MetadataUri) -> Self {
        uri.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xAbCdEf0123456789abcdef0123456789ABCDEF01";

    #[test]
    fn wallet_address_normalizes_to_lowercase() {
        let a = WalletAddress::new(ADDR).unwrap();
        assert_eq!(a.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn wallet_address_case_insensitive_equality() {
        let a = WalletAddress::new(ADDR).unwrap();
        let b = WalletAddress::new(ADDR.to_lowercase()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wallet_address_rejects_bad_shapes() {
        for bad in [
            "",
            "0x",
            "abcdef0123456789abcdef0123456789abcdef01",
            "0xabcdef0123456789abcdef0123456789abcdef0",
            "0xabcdef0123456789abcdef0123456789abcdef012",
            "0xgggggg0123456789abcdef0123456789abcdef01",
            "0Xabcdef0123456789abcdef0123456789abcdef01",
            " 0xabcdef0123456789abcdef0123456789abcdef01",
        ] {
            assert!(WalletAddress::new(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn wallet_address_deserialize_validates() {
        let ok: WalletAddress = serde_json::from_str(&format!("\"{ADDR}\"")).unwrap();
        assert!(ok.as_str().starts_with("0xabcdef"));
        assert!(serde_json::from_str::<WalletAddress>("\"0x1234\"").is_err());
    }

    #[test]
    fn token_id_rejects_zero() {
        assert!(TokenId::new(0).is_err());
        assert_eq!(TokenId::new(7).unwrap().value(), 7);
        assert!(serde_json::from_str::<TokenId>("0").is_err());
    }

    #[test]
    fn token_id_parse_and_next() {
        let id: TokenId = "41".parse().unwrap();
        assert_eq!(id.next().value(), 42);
        assert!("abc".parse::<TokenId>().is_err());
        assert!("-1".parse::<TokenId>().is_err());
        assert_eq!(TokenId::FIRST.value(), 1);
    }

    #[test]
    fn metadata_uri_validation() {
        assert!(MetadataUri::new("ipfs://QmX").is_ok());
        assert!(MetadataUri::new("").is_err());
        assert!(MetadataUri::new("ipfs://a b").is_err());
        assert!(MetadataUri::new("x".repeat(MAX_URI_LEN + 1)).is_err());
    }
}
