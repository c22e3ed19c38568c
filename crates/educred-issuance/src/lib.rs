//! # educred-issuance: Issuance and Verification Workflows
//!
//! Composes the metadata store and the certificate registry:
//!
//! - **Issue** ([`Issuer::issue`]): validate, build and bind the metadata
//!   document, store it, mint with the returned URL.
//! - **Bulk issue** ([`Issuer::issue_bulk`]): CSV intake, per-row issuance,
//!   per-row outcomes. One row failing never aborts the batch.
//! - **Verify** ([`Issuer::verify_certificate`], [`Issuer::verify_owner`]):
//!   registry lookup, metadata dereference, integrity and binding checks.
//!
//! The workflow talks to its collaborators through [`IssuanceBackend`], so
//! the same code drives the in-process service ([`LocalBackend`]) and the
//! remote HTTP client.
//!
//! Every backend call is bounded by [`IssuanceConfig::call_timeout`]. There
//! is no automatic retry and no rollback: a failure after the document is
//! stored leaves that document orphaned in the store.

pub mod backend;
pub mod bulk;
pub mod config;
pub mod error;
pub mod request;
pub mod verification;
pub mod workflow;

pub use backend::{IssuanceBackend, LocalBackend};
pub use bulk::{
    parse_csv, BulkReport, CsvBatch, CsvRow, RowOutcome, SkippedRow, REQUIRED_COLUMNS, SAMPLE_CSV,
};
pub use config::IssuanceConfig;
pub use error::IssuanceError;
pub use request::IssueRequest;
pub use verification::{MetadataCheck, VerificationReport};
pub use workflow::{IssuanceReceipt, Issuer};
