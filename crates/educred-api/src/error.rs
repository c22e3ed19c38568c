//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps store, registry and issuance errors to HTTP status codes and a
//! JSON body with error code, message and optional details. Messages of
//! 5xx errors are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use educred_core::ValidationError;
use educred_issuance::IssuanceError;
use educred_registry::RegistryError;
use educred_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context, present only for some client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient role (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A write was attempted without a signing identity (428).
    #[error("not initialized: {0}")]
    NotInitialized(String),

    /// Payload exceeds the store ceiling (413).
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Stored content failed its integrity check (500).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// A backend the request depends on could not be reached (502).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A backend call exceeded its time bound (504).
    #[error("timeout: {0}")]
    Timeout(String),

    /// Service dependency not configured (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotInitialized(_) => (StatusCode::PRECONDITION_REQUIRED, "NOT_INITIALIZED"),
            Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Integrity(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTEGRITY_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::PayloadTooLarge { size, limit } => {
                Some(serde_json::json!({ "size": size, "limit": limit }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Integrity(_) => "stored content failed its integrity check".to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Upstream(_) => "An upstream service error occurred".to_string(),
            Self::Timeout(_) => "A backend call timed out".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Integrity(_) | Self::Internal(_) | Self::Upstream(_) => {
                tracing::error!(error = %self, "server error")
            }
            Self::Timeout(_) | Self::ServiceUnavailable(_) => {
                tracing::warn!(error = %self, "service degraded")
            }
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("metadata {id}")),
            StoreError::TooLarge { size, limit } => Self::PayloadTooLarge { size, limit },
            StoreError::Validation(e) => Self::Validation(e.to_string()),
            StoreError::Canonicalization(e) => Self::Validation(e.to_string()),
            e @ (StoreError::Integrity { .. } | StoreError::NotADocument { .. }) => {
                Self::Integrity(e.to_string())
            }
            StoreError::Io(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) | RegistryError::IndexOutOfBounds { .. } => {
                Self::NotFound(err.to_string())
            }
            RegistryError::NotInitialized => Self::NotInitialized(err.to_string()),
            RegistryError::Validation(e) => Self::Validation(e.to_string()),
            RegistryError::InvalidRecord(msg) => Self::Internal(msg),
        }
    }
}

impl From<IssuanceError> for AppError {
    fn from(err: IssuanceError) -> Self {
        match err {
            IssuanceError::Validation(msg) => Self::Validation(msg),
            IssuanceError::NotFound(msg) => Self::NotFound(msg),
            IssuanceError::NotInitialized(msg) => Self::NotInitialized(msg),
            IssuanceError::PayloadTooLarge { size, limit } => Self::PayloadTooLarge { size, limit },
            IssuanceError::Integrity(msg) => Self::Integrity(msg),
            IssuanceError::Storage(msg) => Self::Internal(msg),
            IssuanceError::Network(msg) => Self::Upstream(msg),
            e @ IssuanceError::Timeout { .. } => Self::Timeout(e.to_string()),
        }
    }
}
