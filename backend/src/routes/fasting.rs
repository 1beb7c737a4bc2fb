//! Fasting session API routes
//!
//! One session can be active at a time. Starting while active is a
//! conflict; ending awards XP for the completed hours.

use crate::error::ApiError;
use crate::services::FastingService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;
use wellspring_shared::types::{FastingSessionResponse, StartFastRequest};

/// Create fasting routes
pub fn fasting_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(start_fast).get(get_status))
        .route("/end", post(end_fast))
}

/// POST /api/v1/users/:user_id/fasting - Start a fasting session
async fn start_fast(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<StartFastRequest>,
) -> Result<Json<FastingSessionResponse>, ApiError> {
    let response = FastingService::start_fast(state.db(), state.engine(), user_id, req).await?;
    Ok(Json(response))
}

/// POST /api/v1/users/:user_id/fasting/end - End the active session
async fn end_fast(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FastingSessionResponse>, ApiError> {
    let response = FastingService::end_fast(state.db(), state.engine(), user_id).await?;
    Ok(Json(response))
}

/// GET /api/v1/users/:user_id/fasting - Current or most recent session
async fn get_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FastingSessionResponse>, ApiError> {
    let response = FastingService::get_status(state.db(), user_id).await?;
    Ok(Json(response))
}
