//! Integration tests for data export endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_export_json_bundle() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    let food = json!({
        "name": "Export brunch",
        "calories": 500.0,
        "protein_g": 25.0,
        "carbs_g": 55.0,
        "fat_g": 18.0
    });
    app.post(&format!("/api/v1/users/{}/activity/food", user), &food.to_string())
        .await;
    let water = json!({ "amount_ml": 400 });
    app.post(&format!("/api/v1/users/{}/activity/water", user), &water.to_string())
        .await;

    let (status, response) = app.get(&format!("/api/v1/users/{}/export", user)).await;

    assert_eq!(status, StatusCode::OK);
    let export: serde_json::Value = serde_json::from_str(&response).unwrap();

    assert_eq!(export["export_version"], "1.0");
    assert_eq!(export["user_id"], user.to_string());
    assert_eq!(export["food_logs"].as_array().unwrap().len(), 1);
    assert_eq!(export["food_logs"][0]["name"], "Export brunch");
    assert_eq!(export["water_logs"].as_array().unwrap().len(), 1);
    assert!(export["exercise_logs"].as_array().unwrap().is_empty());
    assert!(export["fasting_sessions"].as_array().unwrap().is_empty());
    // The logged day shows up in the derived scores
    assert_eq!(export["daily_scores"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_export_empty_user() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    let (status, response) = app.get(&format!("/api/v1/users/{}/export", user)).await;

    assert_eq!(status, StatusCode::OK);
    let export: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert!(export["food_logs"].as_array().unwrap().is_empty());
    assert!(export["daily_scores"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_export_scores_csv() {
    let app = common::TestApp::new().await;
    let user = common::TestApp::unique_user();

    let water = json!({ "amount_ml": 2000 });
    app.post(&format!("/api/v1/users/{}/activity/water", user), &water.to_string())
        .await;

    let (status, body) = app
        .get(&format!("/api/v1/users/{}/export/scores.csv", user))
        .await;

    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = body.trim_end().lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("date,nutrition,activity,hydration,fasting,overall"));
    // Full water goal scores hydration at 100
    assert!(lines[1].contains("100.0"));
}
