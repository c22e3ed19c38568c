//! Error types for the metadata store.

use educred_core::{CanonicalizationError, ValidationError};
use thiserror::Error;

/// Errors from metadata store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object with this identifier.
    #[error("metadata {0} not found")]
    NotFound(String),

    /// Payload exceeds the configured ceiling.
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Payload size in bytes.
        size: usize,
        /// Configured ceiling in bytes.
        limit: usize,
    },

    /// Stored bytes no longer hash to their identifier.
    #[error("integrity violation for {id}: stored content hashes to {actual}")]
    Integrity {
        /// Identifier the object was requested under.
        id: String,
        /// Identifier recomputed from the stored bytes.
        actual: String,
    },

    /// The object exists but is not a JSON document.
    #[error("metadata {id} is not a JSON document: {reason}")]
    NotADocument {
        /// The identifier.
        id: String,
        /// Parse failure.
        reason: String,
    },

    /// Identifier or URL failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Document could not be canonicalized.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// Backend I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}
