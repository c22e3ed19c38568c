//! The identity a registry write is performed as.

use educred_core::WalletAddress;

use crate::error::RegistryError;

/// Who is calling the registry.
///
/// Reads accept any caller. Writes need a signing identity; it becomes the
/// `issuer` of minted certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    signer: Option<WalletAddress>,
}

impl Caller {
    /// A caller with no signing identity.
    pub fn anonymous() -> Self {
        Self { signer: None }
    }

    /// A caller signing as `address`.
    pub fn signer(address: WalletAddress) -> Self {
        Self {
            signer: Some(address),
        }
    }

    pub fn address(&self) -> Option<&WalletAddress> {
        self.signer.as_ref()
    }

    /// The signing identity, or `NotInitialized`.
    pub fn require_signer(&self) -> Result<&WalletAddress, RegistryError> {
        self.signer.as_ref().ok_or(RegistryError::NotInitialized)
    }
}
