//! Single-certificate issuance input.

use educred_core::{CertificateData, WalletAddress};
use serde::{Deserialize, Serialize};

use crate::error::IssuanceError;

/// What an issuer submits to issue one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub student_name: String,
    /// Contact address. Not written into the metadata document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub wallet_address: String,
    pub course: String,
    pub institution: String,
    pub completion_date: String,
    pub grade: String,
    /// URL of an attachment already in the metadata store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl IssueRequest {
    /// Validate locally. Nothing is sent anywhere when this fails.
    pub fn validate(&self) -> Result<(WalletAddress, CertificateData), IssuanceError> {
        if self.wallet_address.trim().is_empty() {
            return Err(IssuanceError::Validation(
                "wallet_address is required".to_string(),
            ));
        }
        let recipient = WalletAddress::new(self.wallet_address.trim())?;
        let data = CertificateData::new(
            self.student_name.trim(),
            self.course.trim(),
            self.institution.trim(),
            self.completion_date.trim(),
            self.grade.trim(),
        );
        data.validate()?;
        if let Some(image) = &self.image {
            if image.chars().any(char::is_whitespace) {
                return Err(IssuanceError::Validation(format!(
                    "image must be a URL, got {image:?}"
                )));
            }
        }
        Ok((recipient, data))
    }
}
