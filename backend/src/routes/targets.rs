//! User targets API routes

use crate::error::ApiError;
use crate::services::TargetsService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use wellspring_shared::types::{TargetsResponse, UpdateTargetsRequest};

/// Create targets routes
pub fn targets_routes() -> Router<AppState> {
    Router::new().route("/", get(get_targets).put(update_targets))
}

/// GET /api/v1/users/:user_id/targets - Current targets and toggles
///
/// Users without a stored row get the documented defaults.
async fn get_targets(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<TargetsResponse>, ApiError> {
    let response = TargetsService::get(state.db(), user_id).await?;
    Ok(Json(response))
}

/// PUT /api/v1/users/:user_id/targets - Update targets
///
/// Partial update: omitted fields keep their current values.
async fn update_targets(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateTargetsRequest>,
) -> Result<Json<TargetsResponse>, ApiError> {
    let response = TargetsService::update(state.db(), state.engine(), user_id, req).await?;
    Ok(Json(response))
}
