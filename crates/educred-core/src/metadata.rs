//! # Certificate Metadata Documents
//!
//! The JSON document stored in the metadata store for every certificate.
//! Its shape follows the common NFT metadata layout (`name`, `description`,
//! `image`, `attributes`) with an extra `certificate_data` block.
//!
//! ## Binding hash
//!
//! `certificate_data.certificate_hash` binds the document to its recipient:
//! SHA-256 over the canonical bytes of `{"document": <doc with hash blanked>,
//! "recipient": <lowercase address>}`, rendered `0x` + 64 hex digits. A
//! verifier holding the document and the registry owner can recompute it.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::sha256_digest;
use crate::error::{CanonicalizationError, ValidationError};
use crate::identity::WalletAddress;

/// Maximum length of any free-text certificate field, in characters.
pub const MAX_FIELD_LEN: usize = 256;

/// A `trait_type` / `value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

impl Attribute {
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

/// Structured certificate content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateData {
    pub student_name: String,
    pub course: String,
    pub institution: String,
    pub completion_date: String,
    pub grade: String,
    /// `0x`-prefixed binding hash; empty until [`CertificateMetadata::bind`].
    #[serde(default)]
    pub certificate_hash: String,
}

impl CertificateData {
    /// Build unbound certificate data.
    pub fn new(
        student_name: impl Into<String>,
        course: impl Into<String>,
        institution: impl Into<String>,
        completion_date: impl Into<String>,
        grade: impl Into<String>,
    ) -> Self {
        Self {
            student_name: student_name.into(),
            course: course.into(),
            institution: institution.into(),
            completion_date: completion_date.into(),
            grade: grade.into(),
            certificate_hash: String::new(),
        }
    }

    /// Check required fields are present and bounded.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields: [(&'static str, &str); 5] = [
            ("student_name", &self.student_name),
            ("course", &self.course),
            ("institution", &self.institution),
            ("completion_date", &self.completion_date),
            ("grade", &self.grade),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
            if value.chars().count() > MAX_FIELD_LEN {
                return Err(ValidationError::FieldTooLong {
                    field,
                    max: MAX_FIELD_LEN,
                });
            }
        }
        Ok(())
    }
}

/// A certificate metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateMetadata {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub certificate_data: CertificateData,
}

impl CertificateMetadata {
    /// Build the standard document for a completed course.
    ///
    /// `image` is the URL of a previously stored attachment, if any.
    pub fn for_completion(data: CertificateData, image: Option<String>) -> Self {
        let name = format!("{} Certificate", data.course);
        let description = format!(
            "Certificate of completion for {} issued to {}",
            data.course, data.student_name
        );
        let attributes = vec![
            Attribute::new("Course", data.course.clone()),
            Attribute::new("Institution", data.institution.clone()),
            Attribute::new("Grade", data.grade.clone()),
            Attribute::new("Completion Date", data.completion_date.clone()),
            Attribute::new("Student", data.student_name.clone()),
        ];
        Self {
            name,
            description,
            image: image.filter(|s| !s.is_empty()),
            attributes,
            certificate_data: data,
        }
    }

    /// Compute the binding hash for `recipient`.
    ///
    /// Independent of the current `certificate_hash` value.
    pub fn binding_hash(&self, recipient: &WalletAddress) -> Result<String, CanonicalizationError> {
        let mut unbound = self.clone();
        unbound.certificate_data.certificate_hash = String::new();
        let envelope = serde_json::json!({
            "document": unbound,
            "recipient": recipient.as_str(),
        });
        let digest = sha256_digest(&CanonicalBytes::new(&envelope)?);
        Ok(format!("0x{}", digest.to_hex()))
    }

    /// Set `certificate_hash` to the binding hash for `recipient`.
    pub fn bind(mut self, recipient: &WalletAddress) -> Result<Self, CanonicalizationError> {
        self.certificate_data.certificate_hash = self.binding_hash(recipient)?;
        Ok(self)
    }

    /// True if `certificate_hash` matches the binding hash for `recipient`.
    pub fn is_bound_to(&self, recipient: &WalletAddress) -> bool {
        match self.binding_hash(recipient) {
            Ok(expected) => expected == self.certificate_data.certificate_hash,
            Err(_) => false,
        }
    }
}
