//! Registry error types.

use educred_core::{TokenId, ValidationError};
use thiserror::Error;

/// Errors from registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No certificate with this token id.
    #[error("certificate {0} not found")]
    NotFound(TokenId),

    /// `token_of_owner_by_index` past the end of the owner's list.
    #[error("owner {owner} holds {balance} certificates; index {index} is out of bounds")]
    IndexOutOfBounds {
        owner: String,
        index: usize,
        balance: usize,
    },

    /// The caller has no signing identity bound.
    #[error("no signing identity: connect a wallet before issuing or revoking")]
    NotInitialized,

    /// Invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisted records could not be restored.
    #[error("cannot restore registry: {0}")]
    InvalidRecord(String),
}

impl RegistryError {
    /// True for the "does not exist" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::IndexOutOfBounds { .. })
    }
}
