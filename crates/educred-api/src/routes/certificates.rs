//! # Certificate API
//!
//! Routes:
//! - POST /v1/certificates: mint for an owner and metadata URI
//! - POST /v1/certificates/issue: full issuance (store + mint)
//! - POST /v1/certificates/bulk: CSV bulk issuance, per-row results
//! - GET  /v1/certificates/{id}: registry record
//! - GET  /v1/certificates/{id}/owner: current owner
//! - GET  /v1/certificates/{id}/verify: registry verification, never 404
//! - GET  /v1/certificates/{id}/report: registry plus metadata verification
//! - POST /v1/certificates/{id}/revoke: revoke, idempotent
//!
//! Writes need the `issuer` role and a signing address; the address becomes
//! the certificate's issuer.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use educred_issuance::{
    BulkReport, IssuanceReceipt, IssueRequest, MetadataCheck, RowOutcome, SkippedRow,
    VerificationReport,
};
use educred_core::TokenId;
use educred_registry::{Certificate, Revocation, Verification};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::{parse_address, parse_token_id};
use crate::state::AppState;

// ── Request types ───────────────────────────────────────────────────────────

/// Mint request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MintRequest {
    /// Recipient address (`0x` + 40 hex).
    pub owner: String,
    /// Metadata URI, usually `ipfs://{id}` from the metadata store.
    pub metadata_uri: String,
}

/// Single-certificate issuance request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueCertificateRequest {
    pub student_name: String,
    /// Not written into the metadata document.
    #[serde(default)]
    pub email: Option<String>,
    pub wallet_address: String,
    pub course: String,
    pub institution: String,
    pub completion_date: String,
    pub grade: String,
    /// URL of an attachment already in the metadata store.
    #[serde(default)]
    pub image: Option<String>,
}

impl From<IssueCertificateRequest> for IssueRequest {
    fn from(req: IssueCertificateRequest) -> Self {
        Self {
            student_name: req.student_name,
            email: req.email,
            wallet_address: req.wallet_address,
            course: req.course,
            institution: req.institution,
            completion_date: req.completion_date,
            grade: req.grade,
            image: req.image,
        }
    }
}

// ── Response types ──────────────────────────────────────────────────────────

/// A registry entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CertificateResponse {
    pub token_id: u64,
    pub owner: String,
    pub issuer: String,
    pub metadata_uri: String,
    pub issued_at: String,
    /// `valid` or `revoked`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
}

impl From<Certificate> for CertificateResponse {
    fn from(c: Certificate) -> Self {
        Self {
            token_id: c.token_id.value(),
            owner: c.owner.to_string(),
            issuer: c.issuer.to_string(),
            metadata_uri: c.metadata_uri.to_string(),
            issued_at: c.issued_at.to_iso8601(),
            status: c.status.as_str().to_string(),
            revoked_at: c.revoked_at.map(|t| t.to_iso8601()),
        }
    }
}

/// Current owner of a token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerOfResponse {
    pub token_id: u64,
    pub owner: String,
}

/// Registry verification. Unknown tokens give `exists: false`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationResponse {
    pub exists: bool,
    pub is_valid: bool,
    pub owner: Option<String>,
    pub issuer: Option<String>,
    pub issued_at: Option<String>,
}

impl From<Verification> for VerificationResponse {
    fn from(v: Verification) -> Self {
        Self {
            exists: v.exists,
            is_valid: v.is_valid,
            owner: v.owner.map(|a| a.to_string()),
            issuer: v.issuer.map(|a| a.to_string()),
            issued_at: v.issued_at.map(|t| t.to_iso8601()),
        }
    }
}

/// Result of a revoke call.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevocationResponse {
    pub certificate: CertificateResponse,
    /// False when the certificate was already revoked.
    pub newly_revoked: bool,
}

impl From<Revocation> for RevocationResponse {
    fn from(r: Revocation) -> Self {
        Self {
            certificate: r.certificate.into(),
            newly_revoked: r.newly_revoked,
        }
    }
}

/// Successful issuance.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssuanceReceiptResponse {
    pub token_id: u64,
    pub owner: String,
    pub issuer: String,
    pub metadata_id: String,
    pub metadata_uri: String,
    /// `0x`-prefixed binding hash written into the document.
    pub certificate_hash: String,
    pub issued_at: String,
}

impl From<IssuanceReceipt> for IssuanceReceiptResponse {
    fn from(r: IssuanceReceipt) -> Self {
        Self {
            token_id: r.token_id.value(),
            owner: r.owner.to_string(),
            issuer: r.issuer.to_string(),
            metadata_id: r.metadata_id.to_string(),
            metadata_uri: r.metadata_uri.to_string(),
            certificate_hash: r.certificate_hash,
            issued_at: r.issued_at.to_iso8601(),
        }
    }
}

/// Result of one processed CSV row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RowOutcomeResponse {
    pub row: usize,
    pub line: usize,
    pub student_name: String,
    pub wallet_address: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<RowOutcome> for RowOutcomeResponse {
    fn from(o: RowOutcome) -> Self {
        Self {
            row: o.row,
            line: o.line,
            student_name: o.student_name,
            wallet_address: o.wallet_address,
            success: o.success,
            token_id: o.token_id.map(|t| t.value()),
            error: o.error,
        }
    }
}

/// A CSV row dropped at intake.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SkippedRowResponse {
    pub row: usize,
    pub line: usize,
    pub reason: String,
}

impl From<SkippedRow> for SkippedRowResponse {
    fn from(s: SkippedRow) -> Self {
        Self {
            row: s.row,
            line: s.line,
            reason: s.reason,
        }
    }
}

/// Outcome of a bulk run, rows in input order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkReportResponse {
    pub outcomes: Vec<RowOutcomeResponse>,
    pub skipped: Vec<SkippedRowResponse>,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<BulkReport> for BulkReportResponse {
    fn from(r: BulkReport) -> Self {
        Self {
            outcomes: r.outcomes.into_iter().map(Into::into).collect(),
            skipped: r.skipped.into_iter().map(Into::into).collect(),
            succeeded: r.succeeded,
            failed: r.failed,
        }
    }
}

/// Outcome of the metadata check, tagged by `status`:
/// `skipped`, `verified`, `binding_mismatch`, `unavailable` or
/// `integrity_failure`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetadataCheckResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    /// The certificate document, when it could be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub document: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<MetadataCheck> for MetadataCheckResponse {
    fn from(check: MetadataCheck) -> Self {
        let blank = |status: &str| Self {
            status: status.to_string(),
            content_id: None,
            document: None,
            reason: None,
        };
        match check {
            MetadataCheck::Skipped => blank("skipped"),
            MetadataCheck::Verified {
                content_id,
                document,
            } => Self {
                content_id: Some(content_id.to_string()),
                document: serde_json::to_value(document).ok(),
                ..blank("verified")
            },
            MetadataCheck::BindingMismatch {
                content_id,
                document,
            } => Self {
                content_id: Some(content_id.to_string()),
                document: serde_json::to_value(document).ok(),
                ..blank("binding_mismatch")
            },
            MetadataCheck::Unavailable { reason } => Self {
                reason: Some(reason),
                ..blank("unavailable")
            },
            MetadataCheck::IntegrityFailure { reason } => Self {
                reason: Some(reason),
                ..blank("integrity_failure")
            },
        }
    }
}

/// Registry state plus metadata verification for one token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationReportResponse {
    pub token_id: u64,
    pub exists: bool,
    pub is_valid: bool,
    pub owner: Option<String>,
    pub issuer: Option<String>,
    pub issued_at: Option<String>,
    pub revoked_at: Option<String>,
    pub metadata_uri: Option<String>,
    pub metadata: MetadataCheckResponse,
    /// Exists, valid, and metadata verified.
    pub verified: bool,
}

impl From<VerificationReport> for VerificationReportResponse {
    fn from(r: VerificationReport) -> Self {
        Self {
            token_id: r.token_id.value(),
            exists: r.exists,
            is_valid: r.is_valid,
            owner: r.owner.map(|a| a.to_string()),
            issuer: r.issuer.map(|a| a.to_string()),
            issued_at: r.issued_at.map(|t| t.to_iso8601()),
            revoked_at: r.revoked_at.map(|t| t.to_iso8601()),
            metadata_uri: r.metadata_uri.map(|u| u.to_string()),
            metadata: r.metadata.into(),
            verified: r.verified,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────────────

/// Build the certificates router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/certificates", post(mint))
        .route("/v1/certificates/issue", post(issue))
        .route("/v1/certificates/bulk", post(bulk))
        .route("/v1/certificates/{id}", get(get_certificate))
        .route("/v1/certificates/{id}/owner", get(owner_of))
        .route("/v1/certificates/{id}/verify", get(verify))
        .route("/v1/certificates/{id}/report", get(report))
        .route("/v1/certificates/{id}/revoke", post(revoke))
}

/// POST /v1/certificates: mint a certificate.
#[utoipa::path(
    post,
    path = "/v1/certificates",
    request_body = MintRequest,
    responses(
        (status = 201, description = "Certificate minted", body = CertificateResponse),
        (status = 422, description = "Invalid owner or URI", body = crate::error::ErrorBody),
        (status = 428, description = "No signing identity bound", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn mint(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<MintRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CertificateResponse>), AppError> {
    require_role(&caller, Role::Issuer)?;
    let req = extract_json(body)?;
    let owner = parse_address(&req.owner)?;
    let metadata_uri = educred_core::MetadataUri::new(req.metadata_uri)?;
    let certificate = state.mint(&caller.caller(), owner, metadata_uri).await?;
    Ok((StatusCode::CREATED, Json(certificate.into())))
}

/// POST /v1/certificates/issue: validate, store the document, mint.
#[utoipa::path(
    post,
    path = "/v1/certificates/issue",
    request_body = IssueCertificateRequest,
    responses(
        (status = 201, description = "Certificate issued", body = IssuanceReceiptResponse),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
        (status = 428, description = "No signing identity bound", body = crate::error::ErrorBody),
        (status = 504, description = "A backend call timed out", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn issue(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<IssueCertificateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssuanceReceiptResponse>), AppError> {
    require_role(&caller, Role::Issuer)?;
    let req: IssueRequest = extract_json(body)?.into();
    // Checked up front so an unsigned caller stores nothing.
    caller.caller().require_signer()?;
    let receipt = state.issuer(caller.caller()).issue(&req).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// POST /v1/certificates/bulk: issue every row of a CSV body.
#[utoipa::path(
    post,
    path = "/v1/certificates/bulk",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Per-row results", body = BulkReportResponse),
        (status = 422, description = "Missing header or required column", body = crate::error::ErrorBody),
        (status = 428, description = "No signing identity bound", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn bulk(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: String,
) -> Result<Json<BulkReportResponse>, AppError> {
    require_role(&caller, Role::Issuer)?;
    caller.caller().require_signer()?;
    let report = state.issuer(caller.caller()).issue_csv(&body).await?;
    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped.len(),
        "bulk issuance finished"
    );
    Ok(Json(report.into()))
}

/// GET /v1/certificates/{id}: registry record.
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}",
    params(("id" = u64, Path, description = "Token id")),
    responses(
        (status = 200, description = "Certificate found", body = CertificateResponse),
        (status = 404, description = "Never minted", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn get_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CertificateResponse>, AppError> {
    let token_id = parse_token_id(&id)?;
    Ok(Json(state.registry.certificate(token_id)?.into()))
}

/// GET /v1/certificates/{id}/owner: current owner.
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}/owner",
    params(("id" = u64, Path, description = "Token id")),
    responses(
        (status = 200, description = "Owner found", body = OwnerOfResponse),
        (status = 404, description = "Never minted", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn owner_of(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OwnerOfResponse>, AppError> {
    let token_id = parse_token_id(&id)?;
    let owner = state.registry.owner_of(token_id)?;
    Ok(Json(OwnerOfResponse {
        token_id: token_id.value(),
        owner: owner.to_string(),
    }))
}

/// GET /v1/certificates/{id}/verify: registry verification.
///
/// Any integer is a valid question; ids that can never be minted, such as
/// `0`, report `exists: false`. Only non-integers are rejected.
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}/verify",
    params(("id" = u64, Path, description = "Token id")),
    responses(
        (status = 200, description = "Verification result, including for unknown tokens", body = VerificationResponse),
        (status = 422, description = "Not an integer", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn verify(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VerificationResponse>, AppError> {
    let raw = id
        .trim()
        .parse::<u64>()
        .map_err(|_| AppError::Validation(format!("invalid token id: {id:?}")))?;
    let verification = match TokenId::new(raw) {
        Ok(token_id) => state.registry.verify(token_id),
        Err(_) => Verification::missing(),
    };
    Ok(Json(verification.into()))
}

/// GET /v1/certificates/{id}/report: registry plus metadata verification.
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}/report",
    params(("id" = u64, Path, description = "Token id")),
    responses(
        (status = 200, description = "Verification report", body = VerificationReportResponse),
    ),
    tag = "certificates"
)]
pub(crate) async fn report(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<VerificationReportResponse>, AppError> {
    let token_id = parse_token_id(&id)?;
    let report = state
        .issuer(caller.caller())
        .verify_certificate(token_id)
        .await?;
    Ok(Json(report.into()))
}

/// POST /v1/certificates/{id}/revoke: revoke a certificate.
#[utoipa::path(
    post,
    path = "/v1/certificates/{id}/revoke",
    params(("id" = u64, Path, description = "Token id")),
    responses(
        (status = 200, description = "Revoked, or already revoked", body = RevocationResponse),
        (status = 404, description = "Never minted", body = crate::error::ErrorBody),
        (status = 428, description = "No signing identity bound", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn revoke(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<RevocationResponse>, AppError> {
    require_role(&caller, Role::Issuer)?;
    let token_id = parse_token_id(&id)?;
    let revocation = state.revoke(&caller.caller(), token_id).await?;
    Ok(Json(revocation.into()))
}
