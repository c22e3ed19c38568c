//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EduCred API",
        version = "0.1.0",
        description = "Educational certificate registry with a content-addressed metadata store: issuance, bulk issuance, verification and revocation."
    ),
    paths(
        // Metadata
        crate::routes::metadata::store_document,
        crate::routes::metadata::store_file,
        crate::routes::metadata::fetch_document,
        crate::routes::metadata::fetch_file,
        // Certificates
        crate::routes::certificates::mint,
        crate::routes::certificates::issue,
        crate::routes::certificates::bulk,
        crate::routes::certificates::get_certificate,
        crate::routes::certificates::owner_of,
        crate::routes::certificates::verify,
        crate::routes::certificates::report,
        crate::routes::certificates::revoke,
        // Owners
        crate::routes::owners::balance,
        crate::routes::owners::certificates,
        crate::routes::owners::verify_owner,
        // Registry
        crate::routes::registry::stats,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::metadata::StoredObjectResponse,
        crate::routes::certificates::MintRequest,
        crate::routes::certificates::IssueCertificateRequest,
        crate::routes::certificates::CertificateResponse,
        crate::routes::certificates::OwnerOfResponse,
        crate::routes::certificates::VerificationResponse,
        crate::routes::certificates::RevocationResponse,
        crate::routes::certificates::IssuanceReceiptResponse,
        crate::routes::certificates::RowOutcomeResponse,
        crate::routes::certificates::SkippedRowResponse,
        crate::routes::certificates::BulkReportResponse,
        crate::routes::certificates::MetadataCheckResponse,
        crate::routes::certificates::VerificationReportResponse,
        crate::routes::owners::OwnerBalanceResponse,
        crate::routes::owners::OwnerCertificatesResponse,
        crate::routes::registry::RegistryStatsResponse,
        crate::auth::Role,
    )),
    tags(
        (name = "metadata", description = "Content-addressed metadata store"),
        (name = "certificates", description = "Certificate registry, issuance and verification"),
        (name = "owners", description = "Per-owner holdings and verification"),
        (name = "registry", description = "Registry counters"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
