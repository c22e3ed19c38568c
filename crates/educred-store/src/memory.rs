//! In-memory metadata store.

use std::collections::HashMap;
use std::sync::Arc;

use educred_core::ContentId;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::store::{MetadataStore, StoreConfig};

/// A process-local store. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    config: StoreConfig,
    objects: Arc<RwLock<HashMap<String, Arc<Vec<u8>>>>>,
}

impl MemoryMetadataStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            objects: Arc::default(),
        }
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Replace the bytes under `id` without any checks.
    #[cfg(test)]
    pub(crate) fn overwrite(&self, id: &ContentId, bytes: Vec<u8>) {
        self.objects
            .write()
            .insert(id.to_string(), Arc::new(bytes));
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<bool, StoreError> {
        let mut objects = self.objects.write();
        if objects.contains_key(id.as_str()) {
            return Ok(false);
        }
        objects.insert(id.to_string(), Arc::new(bytes.to_vec()));
        Ok(true)
    }

    fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .objects
            .read()
            .get(id.as_str())
            .map(|bytes| bytes.as_ref().clone()))
    }

    fn contains(&self, id: &ContentId) -> Result<bool, StoreError> {
        Ok(self.objects.read().contains_key(id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_roundtrip() {
        let store = MemoryMetadataStore::default();
        let doc = json!({"name": "Rust 101 Certificate", "attributes": []});
        let stored = store.store_document(&doc).unwrap();
        assert_eq!(store.fetch_document(&stored.id).unwrap(), doc);
        assert_eq!(stored.url, format!("ipfs://{}", stored.id));
    }

    #[test]
    fn identical_documents_dedupe() {
        let store = MemoryMetadataStore::default();
        let a = store.store_document(&json!({"a": "1", "b": "2"})).unwrap();
        let b = store.store_document(&json!({"b": "2", "a": "1"})).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn size_is_canonical_length() {
        let store = MemoryMetadataStore::default();
        let stored = store.store_document(&json!({ "k" : "v" })).unwrap();
        assert_eq!(stored.size, r#"{"k":"v"}"#.len());
    }

    #[test]
    fn missing_is_not_found() {
        let store = MemoryMetadataStore::default();
        let id = ContentId::from_digest(&educred_core::sha256_bytes(b"nothing"));
        assert!(matches!(
            store.fetch_document(&id),
            Err(StoreError::NotFound(_))
        ));
        assert!(!store.contains(&id).unwrap());
    }

    #[test]
    fn ceiling_is_enforced() {
        let store = MemoryMetadataStore::new(StoreConfig {
            max_bytes: 8,
            ..StoreConfig::default()
        });
        assert!(store.store_file(b"12345678").is_ok());
        match store.store_file(b"123456789") {
            Err(StoreError::TooLarge { size, limit }) => {
                assert_eq!((size, limit), (9, 8));
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
        assert!(matches!(
            store.store_document(&json!({"long": "document"})),
            Err(StoreError::TooLarge { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn documents_with_floats_round_trip() {
        let store = MemoryMetadataStore::default();
        let document = json!({"score": 9.5, "weights": [0.1, -0.25, 2], "name": "x"});
        let stored = store.store_document(&document).unwrap();
        assert_eq!(store.fetch_document(&stored.id).unwrap(), document);
        assert_eq!(
            store.fetch_file(&stored.id).unwrap(),
            br#"{"name":"x","score":9.5,"weights":[0.1,-0.25,2]}"#.to_vec()
        );
        let again = store.store_document(&document).unwrap();
        assert_eq!(again.id, stored.id);
    }

    #[test]
    fn tampering_is_detected() {
        let store = MemoryMetadataStore::default();
        let stored = store.store_document(&json!({"grade": "A"})).unwrap();
        store.overwrite(&stored.id, br#"{"grade":"F"}"#.to_vec());
        assert!(matches!(
            store.fetch_document(&stored.id),
            Err(StoreError::Integrity { .. })
        ));
    }

    #[test]
    fn binary_file_is_not_a_document() {
        let store = MemoryMetadataStore::default();
        let stored = store.store_file(&[0xff, 0xd8, 0xff, 0xe0]).unwrap();
        assert_eq!(store.fetch_file(&stored.id).unwrap(), vec![0xff, 0xd8, 0xff, 0xe0]);
        assert!(matches!(
            store.fetch_document(&stored.id),
            Err(StoreError::NotADocument { .. })
        ));
    }

    #[test]
    fn custom_gateway_and_parse_url() {
        let store = MemoryMetadataStore::new(StoreConfig {
            gateway: "https://gw.example/ipfs/".to_string(),
            ..StoreConfig::default()
        });
        let stored = store.store_file(b"pdf bytes").unwrap();
        assert!(stored.url.starts_with("https://gw.example/ipfs/Qm"));
        assert_eq!(store.parse_url(&stored.url).unwrap(), stored.id);
    }

    #[test]
    fn clones_share_state() {
        let store = MemoryMetadataStore::default();
        let clone = store.clone();
        let stored = store.store_file(b"shared").unwrap();
        assert!(clone.contains(&stored.id).unwrap());
    }
}
