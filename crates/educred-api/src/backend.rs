//! [`IssuanceBackend`] over the application state.
//!
//! Routes issuance through [`AppState`] so that mints made by the workflow
//! are counted and persisted like direct mints.

use educred_core::{ContentId, MetadataUri, TokenId, WalletAddress};
use educred_issuance::{IssuanceBackend, IssuanceError};
use educred_registry::{Caller, Certificate};
use educred_store::StoredObject;

use crate::error::AppError;
use crate::state::AppState;

/// Application state acting as one caller.
#[derive(Debug, Clone)]
pub struct ApiBackend {
    state: AppState,
    caller: Caller,
}

impl ApiBackend {
    pub fn new(state: AppState, caller: Caller) -> Self {
        Self { state, caller }
    }
}

fn into_issuance(err: AppError) -> IssuanceError {
    match err {
        AppError::NotFound(msg) => IssuanceError::NotFound(msg),
        AppError::Validation(msg) | AppError::BadRequest(msg) => IssuanceError::Validation(msg),
        AppError::NotInitialized(msg) => IssuanceError::NotInitialized(msg),
        AppError::PayloadTooLarge { size, limit } => IssuanceError::PayloadTooLarge { size, limit },
        AppError::Integrity(msg) => IssuanceError::Integrity(msg),
        other => IssuanceError::Storage(other.to_string()),
    }
}

impl IssuanceBackend for ApiBackend {
    async fn store_document(
        &self,
        document: serde_json::Value,
    ) -> Result<StoredObject, IssuanceError> {
        self.state.store_document(&document).map_err(into_issuance)
    }

    async fn mint(
        &self,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> Result<Certificate, IssuanceError> {
        self.state
            .mint(&self.caller, owner, metadata_uri)
            .await
            .map_err(into_issuance)
    }

    async fn fetch_file(&self, id: ContentId) -> Result<Vec<u8>, IssuanceError> {
        Ok(self.state.store.fetch_file(&id)?)
    }

    async fn certificate(&self, token_id: TokenId) -> Result<Option<Certificate>, IssuanceError> {
        Ok(self.state.registry.certificate(token_id).ok())
    }

    async fn tokens_of(&self, owner: WalletAddress) -> Result<Vec<TokenId>, IssuanceError> {
        Ok(self.state.registry.tokens_of(&owner))
    }
}
