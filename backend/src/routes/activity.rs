//! Activity logging API routes
//!
//! Producers for the three quick-log types. Every successful log awards
//! XP through the engine and marks the user's published analytics stale.

use crate::error::ApiError;
use crate::services::ActivityService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use wellspring_shared::types::{
    ActivitySummaryResponse, DateQuery, ExerciseLogResponse, FoodLogResponse, LogExerciseRequest,
    LogFoodRequest, LogWaterRequest, WaterLogResponse,
};

/// Create activity routes
pub fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/food", post(log_food))
        .route("/exercise", post(log_exercise))
        .route("/water", post(log_water))
        .route("/summary", get(get_summary))
}

/// POST /api/v1/users/:user_id/activity/food - Log a food entry
async fn log_food(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<LogFoodRequest>,
) -> Result<Json<FoodLogResponse>, ApiError> {
    let response = ActivityService::log_food(state.db(), state.engine(), user_id, req).await?;
    Ok(Json(response))
}

/// POST /api/v1/users/:user_id/activity/exercise - Log an exercise entry
async fn log_exercise(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<LogExerciseRequest>,
) -> Result<Json<ExerciseLogResponse>, ApiError> {
    let response = ActivityService::log_exercise(state.db(), state.engine(), user_id, req).await?;
    Ok(Json(response))
}

/// POST /api/v1/users/:user_id/activity/water - Log a water entry
async fn log_water(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<LogWaterRequest>,
) -> Result<Json<WaterLogResponse>, ApiError> {
    let response = ActivityService::log_water(state.db(), state.engine(), user_id, req).await?;
    Ok(Json(response))
}

/// GET /api/v1/users/:user_id/activity/summary - Daily activity summary
///
/// Optional `date` query parameter; omitted means today (UTC).
async fn get_summary(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> Result<Json<ActivitySummaryResponse>, ApiError> {
    let response = ActivityService::get_daily_summary(state.db(), user_id, query.date).await?;
    Ok(Json(response))
}
