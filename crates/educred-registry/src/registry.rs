//! # Certificate Registry
//!
//! In-memory registry behind a single `RwLock`. Cloning the handle shares the
//! state; the service holds one clone in its application state and hands
//! others to the issuance workflow.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use educred_core::{MetadataUri, Timestamp, TokenId, WalletAddress};
use parking_lot::RwLock;

use crate::caller::Caller;
use crate::certificate::{Certificate, CertificateInfo, CertificateStatus, Revocation, Verification};
use crate::error::RegistryError;

#[derive(Debug)]
struct RegistryState {
    next_token_id: TokenId,
    certificates: BTreeMap<TokenId, Certificate>,
    /// Token ids per owner, in mint order.
    by_owner: HashMap<WalletAddress, Vec<TokenId>>,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            next_token_id: TokenId::FIRST,
            certificates: BTreeMap::new(),
            by_owner: HashMap::new(),
        }
    }
}

impl RegistryState {
    fn get(&self, token_id: TokenId) -> Result<&Certificate, RegistryError> {
        self.certificates
            .get(&token_id)
            .ok_or(RegistryError::NotFound(token_id))
    }

    fn draft_mint(
        &self,
        issuer: WalletAddress,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> Certificate {
        Certificate {
            token_id: self.next_token_id,
            owner,
            issuer,
            metadata_uri,
            issued_at: Timestamp::now(),
            status: CertificateStatus::Valid,
            revoked_at: None,
        }
    }

    fn commit_mint(&mut self, certificate: Certificate) -> Result<(), RegistryError> {
        let token_id = certificate.token_id;
        if token_id != self.next_token_id {
            return Err(RegistryError::InvalidRecord(format!(
                "token id {token_id} is stale, next id is {}",
                self.next_token_id
            )));
        }
        self.by_owner
            .entry(certificate.owner.clone())
            .or_default()
            .push(token_id);
        self.certificates.insert(token_id, certificate);
        self.next_token_id = token_id.next();
        Ok(())
    }

    fn draft_revoke(&self, token_id: TokenId) -> Result<Revocation, RegistryError> {
        let mut certificate = self.get(token_id)?.clone();
        let newly_revoked = !certificate.status.is_terminal();
        if newly_revoked {
            certificate.status = CertificateStatus::Revoked;
            certificate.revoked_at = Some(Timestamp::now());
        }
        Ok(Revocation {
            certificate,
            newly_revoked,
        })
    }

    /// Apply a drafted revocation. A token revoked in the meantime keeps
    /// its first revocation time.
    fn commit_revoke(&mut self, revoked: &Certificate) -> Result<bool, RegistryError> {
        let token_id = revoked.token_id;
        let certificate = self
            .certificates
            .get_mut(&token_id)
            .ok_or(RegistryError::NotFound(token_id))?;
        if certificate.status.is_terminal() {
            return Ok(false);
        }
        certificate.status = CertificateStatus::Revoked;
        certificate.revoked_at = revoked.revoked_at.or_else(|| Some(Timestamp::now()));
        Ok(true)
    }
}

/// Shared handle to the certificate registry.
#[derive(Debug, Clone, Default)]
pub struct CertificateRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl CertificateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a certificate for `owner` referencing `metadata_uri`.
    ///
    /// The caller's signing identity becomes the issuer. Id allocation and
    /// record insertion happen under one write guard; a rejected mint
    /// consumes no id.
    pub fn mint(
        &self,
        caller: &Caller,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> Result<Certificate, RegistryError> {
        let issuer = caller.require_signer()?.clone();

        let mut state = self.state.write();
        let certificate = state.draft_mint(issuer, owner, metadata_uri);
        state.commit_mint(certificate.clone())?;
        drop(state);

        log_minted(&certificate);
        Ok(certificate)
    }

    /// Build the record the next mint would create, without committing it.
    ///
    /// For callers that persist before committing. The draft is only
    /// accepted by [`commit_mint`](Self::commit_mint) while its id is still
    /// the next one, so callers must serialize prepare and commit.
    pub fn prepare_mint(
        &self,
        caller: &Caller,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> Result<Certificate, RegistryError> {
        let issuer = caller.require_signer()?.clone();
        Ok(self.state.read().draft_mint(issuer, owner, metadata_uri))
    }

    /// Commit a record from [`prepare_mint`](Self::prepare_mint).
    ///
    /// Fails with [`RegistryError::InvalidRecord`] if another mint took the
    /// id first.
    pub fn commit_mint(&self, certificate: Certificate) -> Result<Certificate, RegistryError> {
        self.state.write().commit_mint(certificate.clone())?;
        log_minted(&certificate);
        Ok(certificate)
    }

    /// Revoke a certificate. Revoking an already revoked certificate is a
    /// no-op that reports `newly_revoked: false`.
    pub fn revoke(&self, caller: &Caller, token_id: TokenId) -> Result<Revocation, RegistryError> {
        let revoker = caller.require_signer()?;

        let mut state = self.state.write();
        let revocation = state.draft_revoke(token_id)?;
        if revocation.newly_revoked {
            state.commit_revoke(&revocation.certificate)?;
        }
        drop(state);

        log_revoked(revoker, &revocation);
        Ok(revocation)
    }

    /// The outcome [`revoke`](Self::revoke) would have, without applying it.
    pub fn prepare_revoke(
        &self,
        caller: &Caller,
        token_id: TokenId,
    ) -> Result<Revocation, RegistryError> {
        caller.require_signer()?;
        self.state.read().draft_revoke(token_id)
    }

    /// Apply a revocation from [`prepare_revoke`](Self::prepare_revoke).
    pub fn commit_revoke(
        &self,
        caller: &Caller,
        certificate: &Certificate,
    ) -> Result<Revocation, RegistryError> {
        let revoker = caller.require_signer()?;
        let mut state = self.state.write();
        let newly_revoked = state.commit_revoke(certificate)?;
        let revocation = Revocation {
            certificate: state.get(certificate.token_id)?.clone(),
            newly_revoked,
        };
        drop(state);

        log_revoked(revoker, &revocation);
        Ok(revocation)
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<WalletAddress, RegistryError> {
        Ok(self.state.read().get(token_id)?.owner.clone())
    }

    pub fn certificate_data(&self, token_id: TokenId) -> Result<CertificateInfo, RegistryError> {
        Ok(self.state.read().get(token_id)?.info())
    }

    /// The full record.
    pub fn certificate(&self, token_id: TokenId) -> Result<Certificate, RegistryError> {
        Ok(self.state.read().get(token_id)?.clone())
    }

    pub fn token_uri(&self, token_id: TokenId) -> Result<MetadataUri, RegistryError> {
        Ok(self.state.read().get(token_id)?.metadata_uri.clone())
    }

    pub fn exists(&self, token_id: TokenId) -> bool {
        self.state.read().certificates.contains_key(&token_id)
    }

    /// Number of certificates held by `owner`, revoked ones included.
    pub fn balance_of(&self, owner: &WalletAddress) -> usize {
        self.state.read().by_owner.get(owner).map_or(0, Vec::len)
    }

    /// Token ids held by `owner`, in mint order.
    pub fn tokens_of(&self, owner: &WalletAddress) -> Vec<TokenId> {
        self.state
            .read()
            .by_owner
            .get(owner)
            .cloned()
            .unwrap_or_default()
    }

    /// Records held by `owner`, in mint order.
    pub fn certificates_of(&self, owner: &WalletAddress) -> Vec<Certificate> {
        let state = self.state.read();
        state
            .by_owner
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.certificates.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn token_of_owner_by_index(
        &self,
        owner: &WalletAddress,
        index: usize,
    ) -> Result<TokenId, RegistryError> {
        let state = self.state.read();
        let ids = state.by_owner.get(owner).map(Vec::as_slice).unwrap_or_default();
        ids.get(index)
            .copied()
            .ok_or_else(|| RegistryError::IndexOutOfBounds {
                owner: owner.to_string(),
                index,
                balance: ids.len(),
            })
    }

    /// Number of certificates ever minted.
    pub fn total_supply(&self) -> usize {
        self.state.read().certificates.len()
    }

    /// Number of certificates currently revoked.
    pub fn revoked_count(&self) -> usize {
        self.state
            .read()
            .certificates
            .values()
            .filter(|c| !c.is_valid())
            .count()
    }

    /// Verify a token id. Never fails.
    pub fn verify(&self, token_id: TokenId) -> Verification {
        self.state
            .read()
            .certificates
            .get(&token_id)
            .map_or_else(Verification::missing, Certificate::verification)
    }

    /// Every record, in token order.
    pub fn snapshot(&self) -> Vec<Certificate> {
        self.state.read().certificates.values().cloned().collect()
    }

    /// Replace the registry contents with persisted records.
    ///
    /// The next id becomes one past the highest restored id. Duplicate ids
    /// are rejected and leave the registry untouched.
    pub fn restore(
        &self,
        records: impl IntoIterator<Item = Certificate>,
    ) -> Result<usize, RegistryError> {
        let mut rebuilt = RegistryState::default();
        for record in records {
            let token_id = record.token_id;
            if rebuilt.certificates.contains_key(&token_id) {
                return Err(RegistryError::InvalidRecord(format!(
                    "duplicate token id {token_id}"
                )));
            }
            if token_id >= rebuilt.next_token_id {
                rebuilt.next_token_id = token_id.next();
            }
            rebuilt.certificates.insert(token_id, record);
        }
        // Per-owner lists follow token order, which is mint order.
        for (token_id, record) in &rebuilt.certificates {
            rebuilt
                .by_owner
                .entry(record.owner.clone())
                .or_default()
                .push(*token_id);
        }
        let count = rebuilt.certificates.len();
        *self.state.write() = rebuilt;
        tracing::info!(count, "registry restored from persisted records");
        Ok(count)
    }
}

fn log_minted(certificate: &Certificate) {
    tracing::info!(
        token_id = %certificate.token_id,
        owner = %certificate.owner,
        issuer = %certificate.issuer,
        metadata_uri = %certificate.metadata_uri,
        "certificate minted"
    );
}

fn log_revoked(revoker: &WalletAddress, revocation: &Revocation) {
    let token_id = revocation.certificate.token_id;
    if revocation.newly_revoked {
        tracing::info!(token_id = %token_id, revoker = %revoker, "certificate revoked");
    } else {
        tracing::debug!(token_id = %token_id, "certificate already revoked");
    }
}
