//! # Issuance Backend Seam
//!
//! [`IssuanceBackend`] is the set of store and registry calls the workflow
//! makes. [`LocalBackend`] serves them from in-process handles; the HTTP
//! client crate implements the same trait against a remote service.

use std::future::Future;
use std::sync::Arc;

use educred_core::{ContentId, MetadataUri, TokenId, WalletAddress};
use educred_registry::{Caller, Certificate, CertificateRegistry};
use educred_store::{MetadataStore, StoredObject};

use crate::error::IssuanceError;

/// Store and registry operations used by the issuance workflow.
pub trait IssuanceBackend: Send + Sync {
    /// Canonicalize and store a metadata document.
    fn store_document(
        &self,
        document: serde_json::Value,
    ) -> impl Future<Output = Result<StoredObject, IssuanceError>> + Send;

    /// Mint a certificate as the backend's signing identity.
    fn mint(
        &self,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> impl Future<Output = Result<Certificate, IssuanceError>> + Send;

    /// Fetch stored bytes exactly as stored, documents included.
    fn fetch_file(
        &self,
        id: ContentId,
    ) -> impl Future<Output = Result<Vec<u8>, IssuanceError>> + Send;

    /// The registry record, or `None` if the token was never minted.
    fn certificate(
        &self,
        token_id: TokenId,
    ) -> impl Future<Output = Result<Option<Certificate>, IssuanceError>> + Send;

    /// Token ids held by `owner`, in mint order.
    fn tokens_of(
        &self,
        owner: WalletAddress,
    ) -> impl Future<Output = Result<Vec<TokenId>, IssuanceError>> + Send;
}

/// In-process backend over a metadata store and a registry handle.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    store: Arc<dyn MetadataStore>,
    registry: CertificateRegistry,
    caller: Caller,
}

impl LocalBackend {
    pub fn new(store: Arc<dyn MetadataStore>, registry: CertificateRegistry, caller: Caller) -> Self {
        Self {
            store,
            registry,
            caller,
        }
    }

    /// The same handles acting as a different caller.
    pub fn with_caller(&self, caller: Caller) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: self.registry.clone(),
            caller,
        }
    }

    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    pub fn registry(&self) -> &CertificateRegistry {
        &self.registry
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl IssuanceBackend for LocalBackend {
    async fn store_document(
        &self,
        document: serde_json::Value,
    ) -> Result<StoredObject, IssuanceError> {
        Ok(self.store.store_document(&document)?)
    }

    async fn mint(
        &self,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> Result<Certificate, IssuanceError> {
        Ok(self.registry.mint(&self.caller, owner, metadata_uri)?)
    }

    async fn fetch_file(&self, id: ContentId) -> Result<Vec<u8>, IssuanceError> {
        Ok(self.store.fetch_file(&id)?)
    }

    async fn certificate(&self, token_id: TokenId) -> Result<Option<Certificate>, IssuanceError> {
        Ok(self.registry.certificate(token_id).ok())
    }

    async fn tokens_of(&self, owner: WalletAddress) -> Result<Vec<TokenId>, IssuanceError> {
        Ok(self.registry.tokens_of(&owner))
    }
}
