//! # Metadata Store API
//!
//! Routes:
//! - POST /v1/metadata/documents: canonicalize and store a JSON document
//! - POST /v1/metadata/files: store raw bytes
//! - GET  /v1/metadata/{id}: fetch a document
//! - GET  /v1/metadata/{id}/file: fetch raw bytes
//!
//! Every read is integrity-checked by the store; a mismatch surfaces as
//! `INTEGRITY_ERROR`, never as the tampered bytes.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use educred_core::ContentId;
use educred_store::StoredObject;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Result of a store operation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredObjectResponse {
    /// Content identifier (`Qm…`).
    pub id: String,
    /// Retrieval URL, `gateway + id`.
    pub url: String,
    /// Stored size in bytes.
    pub size: usize,
}

impl From<StoredObject> for StoredObjectResponse {
    fn from(stored: StoredObject) -> Self {
        Self {
            id: stored.id.to_string(),
            url: stored.url,
            size: stored.size,
        }
    }
}

/// Build the metadata router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/metadata/documents", post(store_document))
        .route("/v1/metadata/files", post(store_file))
        .route("/v1/metadata/{id}", get(fetch_document))
        .route("/v1/metadata/{id}/file", get(fetch_file))
}

fn parse_content_id(raw: &str) -> Result<ContentId, AppError> {
    raw.parse::<ContentId>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// POST /v1/metadata/documents: store a JSON document.
#[utoipa::path(
    post,
    path = "/v1/metadata/documents",
    responses(
        (status = 201, description = "Document stored", body = StoredObjectResponse),
        (status = 413, description = "Canonical form exceeds the upload ceiling", body = crate::error::ErrorBody),
        (status = 422, description = "Not a JSON document or contains floats", body = crate::error::ErrorBody),
    ),
    tag = "metadata"
)]
pub(crate) async fn store_document(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredObjectResponse>), AppError> {
    require_role(&caller, Role::Issuer)?;
    let document = extract_json(body)?;
    let stored = state.store_document(&document)?;
    tracing::debug!(id = %stored.id, size = stored.size, "document stored");
    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// POST /v1/metadata/files: store raw bytes.
#[utoipa::path(
    post,
    path = "/v1/metadata/files",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File stored", body = StoredObjectResponse),
        (status = 413, description = "File exceeds the upload ceiling", body = crate::error::ErrorBody),
    ),
    tag = "metadata"
)]
pub(crate) async fn store_file(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredObjectResponse>), AppError> {
    require_role(&caller, Role::Issuer)?;
    let stored = state.store_file(&body)?;
    tracing::debug!(id = %stored.id, size = stored.size, "file stored");
    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// GET /v1/metadata/{id}: fetch a stored document.
#[utoipa::path(
    get,
    path = "/v1/metadata/{id}",
    params(("id" = String, Path, description = "Content identifier")),
    responses(
        (status = 200, description = "The stored JSON document"),
        (status = 404, description = "Unknown identifier", body = crate::error::ErrorBody),
        (status = 500, description = "Stored bytes failed the integrity check", body = crate::error::ErrorBody),
    ),
    tag = "metadata"
)]
pub(crate) async fn fetch_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_content_id(&id)?;
    Ok(Json(state.store.fetch_document(&id)?))
}

/// GET /v1/metadata/{id}/file: fetch stored bytes.
#[utoipa::path(
    get,
    path = "/v1/metadata/{id}/file",
    params(("id" = String, Path, description = "Content identifier")),
    responses(
        (status = 200, description = "The stored bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown identifier", body = crate::error::ErrorBody),
    ),
    tag = "metadata"
)]
pub(crate) async fn fetch_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_content_id(&id)?;
    let bytes = state.store.fetch_file(&id)?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}
