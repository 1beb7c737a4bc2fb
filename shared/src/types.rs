//! API request and response types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::insights::SmartInsight;
use crate::models::UserTargets;
use crate::progression::{Badge, Challenge, LeaderboardEntry, Reward, Streak, UserLevel};
use crate::scoring::HealthScore;
use crate::trends::TrendData;

/// Date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Optional date query parameter; omitted means today
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// History window query parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Days of history to return, capped server-side
    #[serde(default)]
    pub days: Option<u32>,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Activity Logging Types
// ============================================================================

/// Log food request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogFoodRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0.0, max = 10000.0))]
    pub calories: f64,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub protein_g: f64,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub carbs_g: f64,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub fat_g: f64,
    /// When the food was consumed (defaults to now)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<DateTime<Utc>>,
}

/// Food log response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogResponse {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub consumed_at: DateTime<Utc>,
    /// XP granted for this log, 0 when gamification is off
    pub xp_awarded: i64,
}

/// Log exercise request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogExerciseRequest {
    #[validate(length(min = 1, max = 100))]
    pub exercise_type: String,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    #[validate(range(min = 0, max = 10000))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<i32>,
    /// When the session happened (defaults to now)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_at: Option<DateTime<Utc>>,
}

/// Exercise log response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLogResponse {
    pub id: String,
    pub exercise_type: String,
    pub duration_minutes: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<i32>,
    pub performed_at: DateTime<Utc>,
    pub xp_awarded: i64,
}

/// Log water request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogWaterRequest {
    #[validate(range(min = 1, max = 10000))]
    pub amount_ml: i32,
    /// When the water was consumed (defaults to now)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<DateTime<Utc>>,
}

/// Water log response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterLogResponse {
    pub id: String,
    pub amount_ml: i32,
    pub consumed_at: DateTime<Utc>,
    pub xp_awarded: i64,
}

// ============================================================================
// Fasting Types
// ============================================================================

/// Start fast request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartFastRequest {
    /// Target fasting window in hours
    #[validate(range(min = 1, max = 168))]
    pub target_hours: i32,
    /// When the fast began (defaults to now)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// Fasting session response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastingSessionResponse {
    pub id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub target_hours: i32,
    /// Hours fasted so far (active) or in total (completed)
    pub elapsed_hours: f64,
    pub is_active: bool,
    /// Whether a completed fast reached its target; absent while active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub met_target: Option<bool>,
    /// XP granted on completion, 0 otherwise
    pub xp_awarded: i64,
}

// ============================================================================
// Targets Types
// ============================================================================

/// Targets update request; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateTargetsRequest {
    #[validate(range(min = 0.0, max = 20000.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calorie_target: Option<f64>,
    #[validate(range(min = 0.0, max = 2000.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_target_g: Option<f64>,
    #[validate(range(min = 0.0, max = 2000.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_target_g: Option<f64>,
    #[validate(range(min = 0.0, max = 2000.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_target_g: Option<f64>,
    #[validate(range(min = 1, max = 20000))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_water_goal_ml: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamification_enabled: Option<bool>,
}

/// Targets response with effective (fallback-resolved) values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsResponse {
    pub calorie_target: f64,
    pub protein_target_g: f64,
    pub carbs_target_g: f64,
    pub fat_target_g: f64,
    pub daily_water_goal_ml: i32,
    pub gamification_enabled: bool,
}

impl From<&UserTargets> for TargetsResponse {
    fn from(targets: &UserTargets) -> Self {
        Self {
            calorie_target: targets.effective_calorie_target(),
            protein_target_g: targets.effective_protein_target_g(),
            carbs_target_g: targets.effective_carbs_target_g(),
            fat_target_g: targets.effective_fat_target_g(),
            daily_water_goal_ml: targets.effective_water_goal_ml(),
            gamification_enabled: targets.gamification_enabled,
        }
    }
}

// ============================================================================
// Analytics Types
// ============================================================================

/// Score history response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreHistoryResponse {
    pub daily: Vec<HealthScore>,
    pub weekly: Vec<WeeklyScore>,
}

/// Mean overall score for one calendar week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyScore {
    /// Monday of the week
    pub week_start: NaiveDate,
    pub overall: f64,
    /// Days of that week with any logged data
    pub days_with_data: u32,
}

/// Trends response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsResponse {
    pub trends: Vec<TrendData>,
}

/// Insights response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub insights: Vec<SmartInsight>,
    pub generated_at: DateTime<Utc>,
}

/// One day's aggregate activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummaryResponse {
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub meal_count: usize,
    pub exercise_minutes: i64,
    pub exercise_count: usize,
    pub water_ml: i64,
    pub fasting_active: bool,
    pub score: HealthScore,
}

// ============================================================================
// Progression Types
// ============================================================================

/// Full progression state response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionResponse {
    pub level: UserLevel,
    /// Spendable points balance
    pub available_points: i64,
    pub badges: Vec<Badge>,
    pub streaks: Vec<Streak>,
    pub challenges: Vec<Challenge>,
    pub rewards: Vec<Reward>,
}

/// One achievement log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementResponse {
    pub message: String,
    pub achieved_at: DateTime<Utc>,
}

/// Achievement log response, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementResponse>,
}

/// Weekly leaderboard response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub week_start: NaiveDate,
    pub entries: Vec<LeaderboardEntry>,
}

/// Purchase reward request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseRewardRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Purchase reward response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRewardResponse {
    pub reward: Reward,
    /// Balance after the purchase
    pub available_points: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_food_request_validation() {
        let valid = LogFoodRequest {
            name: "Oatmeal".to_string(),
            calories: 350.0,
            protein_g: 12.0,
            carbs_g: 60.0,
            fat_g: 6.0,
            consumed_at: None,
        };
        assert!(valid.validate().is_ok());

        let negative_calories = LogFoodRequest {
            calories: -10.0,
            ..valid.clone()
        };
        assert!(negative_calories.validate().is_err());

        let empty_name = LogFoodRequest {
            name: String::new(),
            ..valid
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_log_exercise_request_validation() {
        let valid = LogExerciseRequest {
            exercise_type: "running".to_string(),
            duration_minutes: 30,
            calories_burned: None,
            performed_at: None,
        };
        assert!(valid.validate().is_ok());

        let zero_minutes = LogExerciseRequest {
            duration_minutes: 0,
            ..valid.clone()
        };
        assert!(zero_minutes.validate().is_err());

        let two_days = LogExerciseRequest {
            duration_minutes: 2880,
            ..valid
        };
        assert!(two_days.validate().is_err());
    }

    #[test]
    fn test_water_request_validation() {
        assert!(LogWaterRequest {
            amount_ml: 500,
            consumed_at: None
        }
        .validate()
        .is_ok());
        assert!(LogWaterRequest {
            amount_ml: 0,
            consumed_at: None
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_targets_response_resolves_fallbacks() {
        let response = TargetsResponse::from(&UserTargets::default());
        assert_eq!(response.calorie_target, 2000.0);
        assert_eq!(response.daily_water_goal_ml, 2000);
        assert!(response.gamification_enabled);
    }

    #[test]
    fn test_date_query_tolerates_missing_date() {
        let query: DateQuery = serde_json::from_str("{}").unwrap();
        assert!(query.date.is_none());

        let query: DateQuery = serde_json::from_str(r#"{"date":"2024-03-01"}"#).unwrap();
        assert_eq!(
            query.date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }
}
