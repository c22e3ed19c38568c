//! # Owner API
//!
//! Routes:
//! - GET /v1/owners/{address}/balance: number of certificates held
//! - GET /v1/owners/{address}/certificates: records in mint order
//! - GET /v1/owners/{address}/verify: a verification report per certificate
//!
//! Addresses compare case-insensitively; unknown owners have balance 0.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::routes::certificates::{CertificateResponse, VerificationReportResponse};
use crate::routes::parse_address;
use crate::state::AppState;

/// Certificates held by an owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerBalanceResponse {
    pub owner: String,
    pub balance: usize,
}

/// An owner's certificates in mint order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerCertificatesResponse {
    pub owner: String,
    pub balance: usize,
    pub certificates: Vec<CertificateResponse>,
}

/// Build the owners router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/owners/{address}/balance", get(balance))
        .route("/v1/owners/{address}/certificates", get(certificates))
        .route("/v1/owners/{address}/verify", get(verify_owner))
}

/// GET /v1/owners/{address}/balance
#[utoipa::path(
    get,
    path = "/v1/owners/{address}/balance",
    params(("address" = String, Path, description = "Owner address")),
    responses(
        (status = 200, description = "Balance", body = OwnerBalanceResponse),
        (status = 422, description = "Malformed address", body = crate::error::ErrorBody),
    ),
    tag = "owners"
)]
pub(crate) async fn balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<OwnerBalanceResponse>, AppError> {
    let owner = parse_address(&address)?;
    Ok(Json(OwnerBalanceResponse {
        balance: state.registry.balance_of(&owner),
        owner: owner.to_string(),
    }))
}

/// GET /v1/owners/{address}/certificates
#[utoipa::path(
    get,
    path = "/v1/owners/{address}/certificates",
    params(("address" = String, Path, description = "Owner address")),
    responses(
        (status = 200, description = "Certificates in mint order", body = OwnerCertificatesResponse),
        (status = 422, description = "Malformed address", body = crate::error::ErrorBody),
    ),
    tag = "owners"
)]
pub(crate) async fn certificates(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<OwnerCertificatesResponse>, AppError> {
    let owner = parse_address(&address)?;
    let certificates: Vec<CertificateResponse> = state
        .registry
        .certificates_of(&owner)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(OwnerCertificatesResponse {
        owner: owner.to_string(),
        balance: certificates.len(),
        certificates,
    }))
}

/// GET /v1/owners/{address}/verify
#[utoipa::path(
    get,
    path = "/v1/owners/{address}/verify",
    params(("address" = String, Path, description = "Owner address")),
    responses(
        (status = 200, description = "One report per certificate, revoked included", body = Vec<VerificationReportResponse>),
        (status = 422, description = "Malformed address", body = crate::error::ErrorBody),
    ),
    tag = "owners"
)]
pub(crate) async fn verify_owner(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(address): Path<String>,
) -> Result<Json<Vec<VerificationReportResponse>>, AppError> {
    let owner = parse_address(&address)?;
    let reports = state.issuer(caller.caller()).verify_owner(&owner).await?;
    Ok(Json(reports.into_iter().map(Into::into).collect()))
}
