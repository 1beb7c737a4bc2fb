//! Health score and analytics API routes
//!
//! Read-only surface over the scoring engine: daily score, score history,
//! trend analysis, and smart insights.

use crate::error::ApiError;
use crate::services::{InsightService, ScoreService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;
use wellspring_shared::types::{
    DateQuery, HistoryQuery, InsightsResponse, ScoreHistoryResponse, TrendsResponse,
};
use wellspring_shared::HealthScore;

/// Create score and analytics routes
pub fn score_routes() -> Router<AppState> {
    Router::new()
        .route("/score", get(get_score))
        .route("/score/history", get(get_history))
        .route("/trends", get(get_trends))
        .route("/insights", get(get_insights))
}

/// GET /api/v1/users/:user_id/score - Health score for one day
///
/// Optional `date` query parameter; omitted means today (UTC). Today's
/// score is served from the engine's published snapshot when that snapshot
/// is dated today, otherwise computed from the activity log.
async fn get_score(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> Result<Json<HealthScore>, ApiError> {
    if query.date.is_none() {
        if let Some(snapshot) = state.snapshots.read().await.get(&user_id).cloned() {
            if snapshot.today.date == Utc::now().date_naive() {
                return Ok(Json(snapshot.today.clone()));
            }
        }
    }

    let score = ScoreService::get_score(state.db(), user_id, query.date).await?;
    Ok(Json(score))
}

/// GET /api/v1/users/:user_id/score/history - Daily and weekly history
///
/// `days` is clamped server-side; the weekly series groups by ISO week
/// starting Monday.
async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ScoreHistoryResponse>, ApiError> {
    let response = ScoreService::get_history(state.db(), user_id, query.days).await?;
    Ok(Json(response))
}

/// GET /api/v1/users/:user_id/trends - Weekly score and exercise trends
///
/// Fixed eight-week window; weeks without logged data are omitted from the
/// series.
async fn get_trends(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let response = ScoreService::get_trends(state.db(), user_id).await?;
    Ok(Json(response))
}

/// GET /api/v1/users/:user_id/insights - Smart insights, best first
///
/// Served from the engine's published snapshot when available, then the
/// Redis cache, then computed on demand.
async fn get_insights(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let response = InsightService::get_insights(
        state.db(),
        state.redis.clone(),
        &state.snapshots,
        state.config().engine.insight_cache_secs,
        user_id,
    )
    .await?;
    Ok(Json(response))
}
