//! # educred-registry: Certificate Registry
//!
//! Maps token ids to certificate records: owner, issuer, metadata URI,
//! issuance time and validity. The registry is the authority for who holds
//! which certificate and whether it is still valid.
//!
//! ## Lifecycle
//!
//! ```text
//! Valid --revoke--> Revoked (terminal)
//! ```
//!
//! There is no transfer and no deletion. Token ids start at 1, strictly
//! increase, and are never reused.
//!
//! ## Concurrency
//!
//! One `parking_lot::RwLock` guards the whole state. Mint allocates the id
//! and commits the record under a single write guard, so concurrent mints
//! never observe or hand out the same id. Reads take the shared guard and see
//! either the pre- or post-mint state.
//!
//! Services that persist records use the two-phase form instead:
//! `prepare_mint` / `commit_mint` and `prepare_revoke` / `commit_revoke`,
//! writing to storage in between. A commit whose id is no longer next is
//! rejected, so such callers serialize their own prepare-persist-commit
//! sections.

pub mod caller;
pub mod certificate;
pub mod error;
pub mod registry;

pub use caller::Caller;
pub use certificate::{Certificate, CertificateInfo, CertificateStatus, Revocation, Verification};
pub use error::RegistryError;
pub use registry::CertificateRegistry;
