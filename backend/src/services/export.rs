//! Data export service
//!
//! Two surfaces:
//! - JSON: the complete logged history plus derived daily scores
//! - CSV: daily score rows for spreadsheets

use crate::error::ApiError;
use crate::repositories::{
    ExerciseLogRepository, FastingSessionRepository, FoodLogRepository, WaterLogRepository,
};
use crate::services::score::fasting_session;
use crate::services::score::ScoreService;
use crate::services::targets::TargetsService;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const EXPORT_VERSION: &str = "1.0";

/// Derived scores cover the trailing year
const SCORE_EXPORT_DAYS: u32 = 365;

/// Complete user data export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDataExport {
    pub export_version: String,
    pub exported_at: DateTime<Utc>,
    pub user_id: String,
    pub food_logs: Vec<FoodLogExport>,
    pub exercise_logs: Vec<ExerciseLogExport>,
    pub water_logs: Vec<WaterLogExport>,
    pub fasting_sessions: Vec<FastingSessionExport>,
    pub daily_scores: Vec<DailyScoreExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogExport {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub consumed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLogExport {
    pub id: String,
    pub exercise_type: String,
    pub duration_minutes: i32,
    pub calories_burned: Option<i32>,
    pub performed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterLogExport {
    pub id: String,
    pub amount_ml: i32,
    pub consumed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastingSessionExport {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub target_hours: i32,
    pub actual_hours: Option<f64>,
    pub met_target: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyScoreExport {
    pub date: NaiveDate,
    pub nutrition: f64,
    pub activity: f64,
    pub hydration: f64,
    pub fasting: f64,
    pub overall: f64,
}

/// CSV export row for daily scores
#[derive(Debug, Clone, Serialize)]
pub struct ScoreCsvRow {
    pub date: String,
    pub nutrition: f64,
    pub activity: f64,
    pub hydration: f64,
    pub fasting: f64,
    pub overall: f64,
}

/// Data export service
pub struct ExportService;

impl ExportService {
    /// Export all user data as JSON
    pub async fn export_json(pool: &PgPool, user_id: Uuid) -> Result<UserDataExport, ApiError> {
        // Fetch all log types in parallel
        let (food, exercise, water, fasting) = tokio::join!(
            Self::fetch_food_logs(pool, user_id),
            Self::fetch_exercise_logs(pool, user_id),
            Self::fetch_water_logs(pool, user_id),
            Self::fetch_fasting_sessions(pool, user_id),
        );

        let targets = TargetsService::get_effective(pool, user_id).await?;
        let scores = ScoreService::daily_scores(pool, user_id, SCORE_EXPORT_DAYS, &targets).await?;

        Ok(UserDataExport {
            export_version: EXPORT_VERSION.to_string(),
            exported_at: Utc::now(),
            user_id: user_id.to_string(),
            food_logs: food?,
            exercise_logs: exercise?,
            water_logs: water?,
            fasting_sessions: fasting?,
            daily_scores: scores
                .into_iter()
                .map(|s| DailyScoreExport {
                    date: s.date,
                    nutrition: s.nutrition,
                    activity: s.activity,
                    hydration: s.hydration,
                    fasting: s.fasting,
                    overall: s.overall,
                })
                .collect(),
        })
    }

    /// Export daily scores as CSV
    pub async fn export_scores_csv(pool: &PgPool, user_id: Uuid) -> Result<String, ApiError> {
        let targets = TargetsService::get_effective(pool, user_id).await?;
        let scores = ScoreService::daily_scores(pool, user_id, SCORE_EXPORT_DAYS, &targets).await?;

        let rows: Vec<ScoreCsvRow> = scores
            .into_iter()
            .map(|s| ScoreCsvRow {
                date: s.date.format("%Y-%m-%d").to_string(),
                nutrition: round1(s.nutrition),
                activity: round1(s.activity),
                hydration: round1(s.hydration),
                fasting: round1(s.fasting),
                overall: round1(s.overall),
            })
            .collect();

        Self::to_csv(&rows)
    }

    /// Convert data to CSV string
    fn to_csv<T: Serialize>(data: &[T]) -> Result<String, ApiError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV flush error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV encoding error: {}", e)))
    }

    async fn fetch_food_logs(pool: &PgPool, user_id: Uuid) -> Result<Vec<FoodLogExport>, ApiError> {
        let (start, end) = full_range();
        let records = FoodLogRepository::get_by_date_range(pool, user_id, start, end).await?;

        Ok(records
            .into_iter()
            .map(|r| FoodLogExport {
                id: r.id.to_string(),
                name: r.name,
                calories: r.calories.to_f64().unwrap_or(0.0),
                protein_g: r.protein_g.to_f64().unwrap_or(0.0),
                carbs_g: r.carbs_g.to_f64().unwrap_or(0.0),
                fat_g: r.fat_g.to_f64().unwrap_or(0.0),
                consumed_at: r.consumed_at,
            })
            .collect())
    }

    async fn fetch_exercise_logs(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ExerciseLogExport>, ApiError> {
        let (start, end) = full_range();
        let records = ExerciseLogRepository::get_by_date_range(pool, user_id, start, end).await?;

        Ok(records
            .into_iter()
            .map(|r| ExerciseLogExport {
                id: r.id.to_string(),
                exercise_type: r.exercise_type,
                duration_minutes: r.duration_minutes,
                calories_burned: r.calories_burned,
                performed_at: r.performed_at,
            })
            .collect())
    }

    async fn fetch_water_logs(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<WaterLogExport>, ApiError> {
        let (start, end) = full_range();
        let records = WaterLogRepository::get_by_date_range(pool, user_id, start, end).await?;

        Ok(records
            .into_iter()
            .map(|r| WaterLogExport {
                id: r.id.to_string(),
                amount_ml: r.amount_ml,
                consumed_at: r.consumed_at,
            })
            .collect())
    }

    async fn fetch_fasting_sessions(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<FastingSessionExport>, ApiError> {
        let records = FastingSessionRepository::get_all(pool, user_id).await?;

        Ok(records
            .iter()
            .map(|r| {
                let session = fasting_session(r);
                let completed = session.ended_at.is_some();
                FastingSessionExport {
                    id: r.id.to_string(),
                    started_at: session.started_at,
                    ended_at: session.ended_at,
                    target_hours: session.target_hours,
                    actual_hours: session.actual_hours(),
                    met_target: completed.then(|| session.met_target()),
                }
            })
            .collect())
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Wide inclusive window that covers every plausible log date
fn full_range() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2100, 12, 31).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_food_export_roundtrip(
            calories in 0.0f64..3000.0,
            protein in 0.0f64..200.0,
            name in "[a-z]{3,12}",
        ) {
            let export = FoodLogExport {
                id: Uuid::new_v4().to_string(),
                name,
                calories,
                protein_g: protein,
                carbs_g: 40.0,
                fat_g: 10.0,
                consumed_at: Utc::now(),
            };

            let json = serde_json::to_string(&export).unwrap();
            let parsed: FoodLogExport = serde_json::from_str(&json).unwrap();

            prop_assert!((parsed.calories - export.calories).abs() < 0.001);
            prop_assert!((parsed.protein_g - export.protein_g).abs() < 0.001);
            prop_assert_eq!(parsed.name, export.name);
        }

        #[test]
        fn test_score_export_roundtrip(
            nutrition in 0.0f64..100.0,
            activity in 0.0f64..100.0,
            hydration in 0.0f64..100.0,
            fasting in 0.0f64..100.0,
        ) {
            let export = DailyScoreExport {
                date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                nutrition,
                activity,
                hydration,
                fasting,
                overall: 50.0,
            };

            let json = serde_json::to_string(&export).unwrap();
            let parsed: DailyScoreExport = serde_json::from_str(&json).unwrap();

            prop_assert!((parsed.nutrition - export.nutrition).abs() < 0.001);
            prop_assert!((parsed.activity - export.activity).abs() < 0.001);
            prop_assert_eq!(parsed.date, export.date);
        }
    }

    #[test]
    fn test_full_export_serialization() {
        let export = UserDataExport {
            export_version: EXPORT_VERSION.to_string(),
            exported_at: Utc::now(),
            user_id: Uuid::new_v4().to_string(),
            food_logs: vec![],
            exercise_logs: vec![],
            water_logs: vec![],
            fasting_sessions: vec![],
            daily_scores: vec![],
        };

        let json = serde_json::to_string(&export).unwrap();
        let parsed: UserDataExport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.export_version, "1.0");
    }

    #[test]
    fn test_scores_csv_has_header_and_rows() {
        let rows = vec![
            ScoreCsvRow {
                date: "2024-03-14".to_string(),
                nutrition: 72.5,
                activity: 100.0,
                hydration: 80.0,
                fasting: 0.0,
                overall: 71.0,
            },
            ScoreCsvRow {
                date: "2024-03-15".to_string(),
                nutrition: 65.0,
                activity: 50.0,
                hydration: 100.0,
                fasting: 93.8,
                overall: 70.1,
            },
        ];

        let csv = ExportService::to_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.trim_end().lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,nutrition,activity"));
        assert!(lines[1].starts_with("2024-03-14,72.5"));
    }

    #[test]
    fn test_round1_truncates_noise() {
        assert_eq!(round1(71.04), 71.0);
        assert_eq!(round1(71.05), 71.1);
        assert_eq!(round1(0.0), 0.0);
    }
}
