//! Data export API routes

use crate::error::ApiError;
use crate::services::ExportService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

/// Create export routes
pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(export_json))
        .route("/scores.csv", get(export_scores_csv))
}

/// GET /api/v1/users/:user_id/export - Export all user data as JSON
async fn export_json(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let export = ExportService::export_json(state.db(), user_id).await?;

    let json = serde_json::to_string_pretty(&export)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("JSON serialization error: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"wellspring-export.json\""),
    );

    Ok((headers, json))
}

/// GET /api/v1/users/:user_id/export/scores.csv - Daily scores as CSV
async fn export_scores_csv(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let csv = ExportService::export_scores_csv(state.db(), user_id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"scores.csv\""),
    );

    Ok((headers, csv))
}
