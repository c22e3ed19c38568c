//! # Metadata Store Contract
//!
//! [`MetadataStore`] is object-safe so the service can hold an
//! `Arc<dyn MetadataStore>` and swap backends from configuration.
//!
//! Backends implement three primitives (`put`, `get`, `contains`) plus
//! `config`; the public operations are provided methods built on them, so
//! size limits, hashing and integrity checks behave identically across
//! backends.

use educred_core::{sha256_bytes, sha256_digest, CanonicalBytes, ContentId};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::StoreError;

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Default retrieval URL prefix.
pub const DEFAULT_GATEWAY: &str = "ipfs://";

/// Store limits and URL formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Largest accepted payload in bytes. Documents are measured after
    /// canonicalization.
    pub max_bytes: usize,
    /// Prefix for retrieval URLs; `resolve_url(id) == gateway + id`.
    pub gateway: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            gateway: DEFAULT_GATEWAY.to_string(),
        }
    }
}

/// Result of a store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: ContentId,
    pub url: String,
    /// Stored size in bytes.
    pub size: usize,
}

/// A content-addressed store for metadata documents and files.
pub trait MetadataStore: Send + Sync + std::fmt::Debug {
    /// Limits and gateway for this store.
    fn config(&self) -> &StoreConfig;

    /// Write `bytes` under `id` unless already present. Returns `true` if a
    /// new object was written.
    ///
    /// Callers guarantee `id` is the identifier of `bytes`.
    fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<bool, StoreError>;

    /// Raw stored bytes, unverified. `None` if absent.
    fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Whether an object with this identifier is stored.
    fn contains(&self, id: &ContentId) -> Result<bool, StoreError>;

    /// Store opaque binary content.
    fn store_file(&self, bytes: &[u8]) -> Result<StoredObject, StoreError> {
        check_size(self.config(), bytes.len())?;
        let id = ContentId::from_digest(&sha256_bytes(bytes));
        commit(self, id, bytes)
    }

    /// Canonicalize and store a JSON document.
    fn store_document(&self, document: &serde_json::Value) -> Result<StoredObject, StoreError> {
        let canonical = CanonicalBytes::from_document(document)?;
        check_size(self.config(), canonical.len())?;
        let id = ContentId::from_digest(&sha256_digest(&canonical));
        commit(self, id, canonical.as_bytes())
    }

    /// Fetch and verify a stored file.
    fn fetch_file(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        let bytes = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        verify_integrity(id, &bytes)?;
        Ok(bytes)
    }

    /// Fetch, verify and parse a stored document.
    fn fetch_document(&self, id: &ContentId) -> Result<serde_json::Value, StoreError> {
        let bytes = self.fetch_file(id)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::NotADocument {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Retrieval URL for an identifier. Pure; does not check presence.
    fn resolve_url(&self, id: &ContentId) -> String {
        format!("{}{}", self.config().gateway, id)
    }

    /// Extract the identifier from a retrieval URL.
    ///
    /// Accepts any gateway prefix as long as the last path segment is a valid
    /// identifier, and bare identifiers.
    fn parse_url(&self, url: &str) -> Result<ContentId, StoreError> {
        Ok(content_id_from_url(url)?)
    }
}

fn check_size(config: &StoreConfig, size: usize) -> Result<(), StoreError> {
    if size > config.max_bytes {
        return Err(StoreError::TooLarge {
            size,
            limit: config.max_bytes,
        });
    }
    Ok(())
}

fn commit<S: MetadataStore + ?Sized>(
    store: &S,
    id: ContentId,
    bytes: &[u8],
) -> Result<StoredObject, StoreError> {
    if store.put(&id, bytes)? {
        tracing::debug!(id = %id, size = bytes.len(), "stored metadata object");
    }
    Ok(StoredObject {
        url: store.resolve_url(&id),
        size: bytes.len(),
        id,
    })
}

/// Extract a content identifier from a URL such as `ipfs://Qm…` or
/// `https://gateway.example/ipfs/Qm…`.
pub fn content_id_from_url(url: &str) -> Result<ContentId, educred_core::ValidationError> {
    let without_fragment = url.split(['#', '?']).next().unwrap_or(url);
    let tail = without_fragment
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(without_fragment);
    ContentId::parse(tail)
}

/// Recompute the identifier of `bytes` and compare to `id` in constant time.
pub(crate) fn verify_integrity(id: &ContentId, bytes: &[u8]) -> Result<(), StoreError> {
    let recomputed = sha256_bytes(bytes);
    if !bool::from(recomputed.as_bytes().ct_eq(id.digest().as_bytes())) {
        return Err(StoreError::Integrity {
            id: id.to_string(),
            actual: ContentId::from_digest(&recomputed).to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_parsing_accepts_gateways() {
        let id = ContentId::from_digest(&sha256_bytes(b"doc"));
        for url in [
            format!("ipfs://{id}"),
            format!("https://gateway.pinata.cloud/ipfs/{id}"),
            format!("https://gw.example/ipfs/{id}/"),
            format!("https://gw.example/ipfs/{id}?filename=cert.json"),
            id.to_string(),
        ] {
            assert_eq!(content_id_from_url(&url).unwrap(), id, "{url}");
        }
    }

    #[test]
    fn url_parsing_rejects_non_identifiers() {
        assert!(content_id_from_url("ipfs://").is_err());
        assert!(content_id_from_url("https://example.com/cert.json").is_err());
    }

    #[test]
    fn integrity_check() {
        let id = ContentId::from_digest(&sha256_bytes(b"abc"));
        assert!(verify_integrity(&id, b"abc").is_ok());
        let err = verify_integrity(&id, b"abd").unwrap_err();
        assert!(matches!(err, StoreError::Integrity { .. }));
    }
}
