//! Route definitions for the Wellspring API
//!
//! This module organizes all API routes and applies middleware.

use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod activity;
mod export;
mod fasting;
mod health;
mod progression;
mod score;
mod targets;

pub use activity::activity_routes;
pub use export::export_routes;
pub use fasting::fasting_routes;
pub use progression::progression_routes;
pub use score::score_routes;
pub use targets::targets_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState, metrics: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(move || std::future::ready(metrics.render())))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Wellspring API v1" }))
        .nest("/users/:user_id", user_routes())
}

/// Routes scoped to a single user
fn user_routes() -> Router<AppState> {
    Router::new()
        .nest("/activity", activity_routes())
        .nest("/fasting", fasting_routes())
        .nest("/targets", targets_routes())
        .nest("/progression", progression_routes())
        .nest("/export", export_routes())
        .merge(score_routes())
}
