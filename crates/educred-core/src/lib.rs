//! # educred-core: Foundational Types for EduCred
//!
//! Every other crate in the workspace depends on `educred-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `WalletAddress`, `TokenId`,
//!    `MetadataUri`, `ContentId` all have validated constructors. No bare
//!    strings for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** Every metadata digest flows through
//!    RFC 8785 canonicalization, so two semantically equal documents always
//!    produce the same content identifier.
//!
//! 3. **Content identifiers are hashes.** A `ContentId` can only be built from
//!    a `ContentDigest`, which in turn can only be computed from bytes. There
//!    is no way to mint an identifier that does not describe its content.
//!
//! 4. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `educred-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod cid;
pub mod digest;
pub mod error;
pub mod identity;
pub mod metadata;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use cid::ContentId;
pub use digest::{sha256_bytes, sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, EduCredError, ValidationError};
pub use identity::{MetadataUri, TokenId, WalletAddress};
pub use metadata::{Attribute, CertificateData, CertificateMetadata};
pub use temporal::Timestamp;
