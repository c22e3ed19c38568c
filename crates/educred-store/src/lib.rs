//! # educred-store: Content-Addressed Metadata Store
//!
//! Holds certificate metadata documents and opaque attachments (images,
//! PDFs) under identifiers derived from their bytes.
//!
//! ## Identifiers
//!
//! - Documents are canonicalized (`CanonicalBytes`) and the identifier is the
//!   base58 SHA-256 multihash of the canonical bytes.
//! - Files are hashed as-is.
//!
//! In both cases the stored bytes are exactly the hashed bytes, so every
//! backend verifies integrity on read by recomputing the identifier from what
//! it read.
//!
//! ## Backends
//!
//! - [`MemoryMetadataStore`]: in-process, the default.
//! - [`FsMetadataStore`]: one file per object under a root directory.
//!
//! Both enforce the size ceiling from [`StoreConfig`] themselves.

pub mod error;
pub mod fs;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use fs::FsMetadataStore;
pub use memory::MemoryMetadataStore;
pub use store::{
    content_id_from_url, MetadataStore, StoreConfig, StoredObject, DEFAULT_GATEWAY,
    DEFAULT_MAX_BYTES,
};
