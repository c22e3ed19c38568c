//! # Error Hierarchy
//!
//! Structured error types shared by every EduCred crate, built with
//! `thiserror`. Subsystem crates define their own error enums and convert
//! from these where a core primitive is involved.

use thiserror::Error;

/// Top-level error type for the core primitives.
#[derive(Error, Debug)]
pub enum EduCredError {
    /// Canonicalization failure during digest computation.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Integrity violation in content-addressed storage.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical documents.
    /// Grades, dates and scores are carried as strings.
    #[error("float values are not permitted in canonical documents; use a string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation failures for domain primitives and issuance input.
///
/// These are raised before any store or registry call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Wallet address is not `0x` followed by 40 hex digits.
    #[error("invalid wallet address format: {0:?}")]
    InvalidWalletAddress(String),

    /// Token ids start at 1.
    #[error("invalid token id: {0}")]
    InvalidTokenId(String),

    /// Metadata URI is empty or too long.
    #[error("invalid metadata URI: {0}")]
    InvalidMetadataUri(String),

    /// Content identifier is not a base58 SHA-256 multihash.
    #[error("invalid content identifier {value:?}: {reason}")]
    InvalidContentId {
        /// The rejected identifier.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Timestamp could not be parsed or is not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A required field was missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A field exceeded its length bound.
    #[error("{field} must not exceed {max} characters")]
    FieldTooLong {
        /// The offending field.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },
}
