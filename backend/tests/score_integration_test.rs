//! Integration tests for score, history, trends, and insights endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_score_empty_day_is_zero() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    let (status, response) = app
        .get(&format!("/api/v1/users/{}/score?date=2024-02-01", user))
        .await;

    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["overall"], 0.0);
    assert_eq!(response["nutrition"], 0.0);
    assert_eq!(response["activity"], 0.0);
    assert_eq!(response["date"], "2024-02-01");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_score_reflects_logged_activity() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    // Full water goal and a 30 minute session push two components to 100
    let water = json!({ "amount_ml": 2000 });
    app.post(&format!("/api/v1/users/{}/activity/water", user), &water.to_string())
        .await;
    let exercise = json!({ "exercise_type": "cycling", "duration_minutes": 30 });
    app.post(&format!("/api/v1/users/{}/activity/exercise", user), &exercise.to_string())
        .await;
    app.wait_for_engine().await;

    let (status, response) = app.get(&format!("/api/v1/users/{}/score", user)).await;

    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["hydration"], 100.0);
    // 30 minutes earns full duration credit plus one variety bonus
    assert_eq!(response["activity"], 100.0);
    assert!(response["overall"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_history_shape() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    let water = json!({ "amount_ml": 1000 });
    app.post(&format!("/api/v1/users/{}/activity/water", user), &water.to_string())
        .await;

    let (status, response) = app
        .get(&format!("/api/v1/users/{}/score/history?days=30", user))
        .await;

    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    let daily = response["daily"].as_array().unwrap();
    let weekly = response["weekly"].as_array().unwrap();

    // Only days with data appear
    assert_eq!(daily.len(), 1);
    assert_eq!(weekly.len(), 1);
    assert_eq!(weekly[0]["days_with_data"], 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_trends_empty_user() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    let (status, response) = app.get(&format!("/api/v1/users/{}/trends", user)).await;

    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    let trends = response["trends"].as_array().unwrap();

    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0]["metric"], "health_score");
    assert_eq!(trends[1]["metric"], "exercise_minutes");
    for trend in trends {
        assert_eq!(trend["direction"], "stable");
        assert!(trend["prediction"].is_null());
        assert!(trend["values"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_insights_empty_user() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    let (status, response) = app.get(&format!("/api/v1/users/{}/insights", user)).await;

    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert!(response["insights"].as_array().unwrap().is_empty());
    assert!(!response["generated_at"].as_str().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_insights_served_from_snapshot_after_recompute() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    let water = json!({ "amount_ml": 750 });
    app.post(&format!("/api/v1/users/{}/activity/water", user), &water.to_string())
        .await;
    app.wait_for_engine().await;

    let (status, first) = app.get(&format!("/api/v1/users/{}/insights", user)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = app.get(&format!("/api/v1/users/{}/insights", user)).await;
    assert_eq!(status, StatusCode::OK);

    // The published snapshot is stable between reads
    let first: serde_json::Value = serde_json::from_str(&first).unwrap();
    let second: serde_json::Value = serde_json::from_str(&second).unwrap();
    assert_eq!(first["generated_at"], second["generated_at"]);
}
