//! Issuance error taxonomy.
//!
//! Distinguishes definitive rejections (validation, not found, no signer)
//! from transient failures (network, timeout) so callers can decide whether
//! trying again could help.

use std::time::Duration;

use educred_core::{CanonicalizationError, ValidationError};
use educred_registry::RegistryError;
use educred_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IssuanceError {
    /// Input rejected before any backend call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced certificate or metadata does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No signing identity for a write.
    #[error("not initialized: {0}")]
    NotInitialized(String),

    /// Payload exceeds the store ceiling.
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Stored content does not match its identifier, or is not the
    /// expected kind of document.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Store or persistence backend failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Transport failure reaching a remote backend.
    #[error("network error: {0}")]
    Network(String),

    /// A backend call did not finish in time.
    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl IssuanceError {
    /// True for failures that may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout { .. })
    }
}

impl From<ValidationError> for IssuanceError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CanonicalizationError> for IssuanceError {
    fn from(err: CanonicalizationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for IssuanceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("metadata {id}")),
            StoreError::TooLarge { size, limit } => Self::PayloadTooLarge { size, limit },
            StoreError::Validation(e) => Self::Validation(e.to_string()),
            StoreError::Canonicalization(e) => Self::Validation(e.to_string()),
            e @ (StoreError::Integrity { .. } | StoreError::NotADocument { .. }) => {
                Self::Integrity(e.to_string())
            }
            StoreError::Io(e) => Self::Storage(e.to_string()),
        }
    }
}

impl From<RegistryError> for IssuanceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotInitialized => Self::NotInitialized(err.to_string()),
            RegistryError::NotFound(_) | RegistryError::IndexOutOfBounds { .. } => {
                Self::NotFound(err.to_string())
            }
            RegistryError::Validation(e) => Self::Validation(e.to_string()),
            RegistryError::InvalidRecord(msg) => Self::Storage(msg),
        }
    }
}
