//! # Content Identifiers
//!
//! `ContentId` is the identifier handed out by the metadata store. It is the
//! base58btc encoding of a SHA-256 multihash (`0x12 0x20 || digest`), the same
//! shape as an IPFS CIDv0: 46 characters, always starting with `Qm`.
//!
//! Because the identifier is just an encoded digest, a verifier holding the
//! fetched bytes can recompute it and compare.

use std::str::FromStr;

use base58::{FromBase58, ToBase58};
use serde::{Deserialize, Serialize};

use crate::digest::{ContentDigest, DigestAlgorithm};
use crate::error::ValidationError;

/// Encoded length of a SHA-256 multihash in base58btc.
pub const CONTENT_ID_LEN: usize = 46;

/// A validated content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId {
    encoded: String,
    digest: ContentDigest,
}

impl ContentId {
    /// Encode a digest as a content identifier.
    pub fn from_digest(digest: &ContentDigest) -> Self {
        let algo = digest.algorithm;
        let mut multihash = Vec::with_capacity(2 + digest.bytes.len());
        multihash.push(algo.multihash_code());
        multihash.push(algo.digest_len());
        multihash.extend_from_slice(&digest.bytes);
        Self {
            encoded: multihash.to_base58(),
            digest: digest.clone(),
        }
    }

    /// Parse and validate an identifier string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let digest = decode(s)?;
        Ok(Self {
            encoded: s.to_string(),
            digest,
        })
    }

    /// The digest this identifier encodes.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

fn decode(s: &str) -> Result<ContentDigest, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidContentId {
        value: s.to_string(),
        reason,
    };
    if s.len() != CONTENT_ID_LEN {
        return Err(invalid(format!(
            "expected {CONTENT_ID_LEN} characters, got {}",
            s.len()
        )));
    }
    let raw = s
        .from_base58()
        .map_err(|e| invalid(format!("not base58: {e:?}")))?;
    let algo = DigestAlgorithm::Sha256;
    if raw.len() != 34 || raw[0] != algo.multihash_code() || raw[1] != algo.digest_len() {
        return Err(invalid("not a sha256 multihash".to_string()));
    }
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&raw[2..]);
    Ok(ContentDigest::new(algo, bytes))
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for ContentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digest = decode(&value)?;
        Ok(Self {
            encoded: value,
            digest,
        })
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.encoded
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::sha256_bytes;

    #[test]
    fn encoded_shape_is_cidv0() {
        let id = ContentId::from_digest(&sha256_bytes(b"hello"));
        assert_eq!(id.as_str().len(), CONTENT_ID_LEN);
        assert!(id.as_str().starts_with("Qm"));
    }

    #[test]
    fn digest_recovers_original() {
        let d = sha256_bytes(b"");
        let id = ContentId::from_digest(&d);
        let parsed = ContentId::parse(id.as_str()).unwrap();
        assert_eq!(parsed.digest(), &d);
        assert_eq!(
            parsed.digest().to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(ContentId::parse("QmShort").is_err());
        assert!(ContentId::parse("").is_err());
    }

    #[test]
    fn rejects_non_base58_characters() {
        // '0', 'O', 'I' and 'l' are outside the base58 alphabet.
        let bad = format!("Qm{}", "0".repeat(CONTENT_ID_LEN - 2));
        assert!(ContentId::parse(&bad).is_err());
    }

    #[test]
    fn rejects_tampered_identifier() {
        let id = ContentId::from_digest(&sha256_bytes(b"x"));
        let mut chars: Vec<char> = id.as_str().chars().collect();
        chars[0] = 'z';
        let tampered: String = chars.into_iter().collect();
        assert!(ContentId::parse(&tampered).is_err());
    }

    #[test]
    fn serde_roundtrip_validates() {
        let id = ContentId::from_digest(&sha256_bytes(b"doc"));
        let json = serde_json::to_string(&id).unwrap();
        let back: ContentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ContentId>("\"nope\"").is_err());
    }
}
