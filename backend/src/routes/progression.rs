//! Progression API routes
//!
//! Gamification state reads plus the purchase command. Purchases go
//! through the engine worker so balance checks stay serialized with XP
//! awards.

use crate::error::ApiError;
use crate::services::ProgressionService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use wellspring_shared::types::{
    AchievementsResponse, LeaderboardResponse, ProgressionResponse, PurchaseRewardRequest,
    PurchaseRewardResponse,
};

/// Create progression routes
pub fn progression_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_progression))
        .route("/leaderboard", get(get_leaderboard))
        .route("/achievements", get(get_achievements))
        .route("/rewards/purchase", post(purchase_reward))
}

/// GET /api/v1/users/:user_id/progression - Full progression state
///
/// Users the engine has never touched see the catalogs at zero progress.
async fn get_progression(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProgressionResponse>, ApiError> {
    let response = ProgressionService::get_progression(state.db(), user_id).await?;
    Ok(Json(response))
}

/// GET /api/v1/users/:user_id/progression/leaderboard - Weekly standings
async fn get_leaderboard(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let size = state.config().engine.leaderboard_size;
    let response = ProgressionService::get_leaderboard(state.db(), user_id, size).await?;
    Ok(Json(response))
}

/// GET /api/v1/users/:user_id/progression/achievements - Recent milestones
async fn get_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AchievementsResponse>, ApiError> {
    let response = ProgressionService::get_achievements(state.db(), user_id).await?;
    Ok(Json(response))
}

/// POST /api/v1/users/:user_id/progression/rewards/purchase - Spend points
async fn purchase_reward(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<PurchaseRewardRequest>,
) -> Result<Json<PurchaseRewardResponse>, ApiError> {
    let response = ProgressionService::purchase_reward(state.engine(), user_id, req).await?;
    Ok(Json(response))
}
