//! # Registry Stats API
//!
//! - GET /v1/registry/stats: supply counters

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Registry counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistryStatsResponse {
    /// Certificates ever minted. Revocation does not reduce it.
    pub total_supply: usize,
    pub valid: usize,
    pub revoked: usize,
}

/// Build the registry router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/registry/stats", get(stats))
}

/// GET /v1/registry/stats
#[utoipa::path(
    get,
    path = "/v1/registry/stats",
    responses(
        (status = 200, description = "Registry counters", body = RegistryStatsResponse),
    ),
    tag = "registry"
)]
pub(crate) async fn stats(State(state): State<AppState>) -> Json<RegistryStatsResponse> {
    let total_supply = state.registry.total_supply();
    let revoked = state.registry.revoked_count();
    Json(RegistryStatsResponse {
        total_supply,
        valid: total_supply.saturating_sub(revoked),
        revoked,
    })
}
