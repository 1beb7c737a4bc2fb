//! Activity service - business logic for food, exercise, and water logging
//!
//! Every successful log nudges the engine twice: once with the typed XP
//! award and once with a data-changed notification that schedules the
//! debounced recompute.

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::events::{EngineHandle, XpAward, XpReason};
use crate::repositories::{
    CreateExerciseLog, CreateFoodLog, CreateWaterLog, ExerciseLogRepository,
    FastingSessionRepository, FoodLogRepository, WaterLogRepository,
};
use crate::services::score::ScoreService;
use crate::services::targets::TargetsService;
use wellspring_shared::progression::{exercise_xp, water_xp, XP_PER_FOOD_LOG};
use wellspring_shared::validation::{
    normalize_exercise_type, normalize_food_name, validate_event_timestamp,
};
use wellspring_shared::{
    score_for_day, ActivitySummaryResponse, ExerciseLogResponse, FoodLogResponse, LogExerciseRequest,
    LogFoodRequest, LogWaterRequest, WaterLogResponse,
};

fn decimal_to_f64(d: &Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Activity service
pub struct ActivityService;

impl ActivityService {
    /// Log a food entry
    pub async fn log_food(
        db: &PgPool,
        engine: &EngineHandle,
        user_id: Uuid,
        request: LogFoodRequest,
    ) -> Result<FoodLogResponse, ApiError> {
        request.validate()?;

        let now = Utc::now();
        let consumed_at = request.consumed_at.unwrap_or(now);
        validate_event_timestamp(consumed_at, now).map_err(ApiError::Validation)?;
        let name = normalize_food_name(&request.name).map_err(ApiError::Validation)?;

        let record = FoodLogRepository::create(
            db,
            CreateFoodLog {
                user_id,
                name,
                calories: request.calories,
                protein_g: request.protein_g,
                carbs_g: request.carbs_g,
                fat_g: request.fat_g,
                consumed_at,
            },
        )
        .await?;

        let xp_awarded = Self::award(db, engine, user_id, XP_PER_FOOD_LOG, XpReason::FoodLogged).await?;
        engine.notify_data_changed(user_id).await;

        Ok(FoodLogResponse {
            id: record.id.to_string(),
            name: record.name,
            calories: decimal_to_f64(&record.calories),
            protein_g: decimal_to_f64(&record.protein_g),
            carbs_g: decimal_to_f64(&record.carbs_g),
            fat_g: decimal_to_f64(&record.fat_g),
            consumed_at: record.consumed_at,
            xp_awarded,
        })
    }

    /// Log an exercise session
    pub async fn log_exercise(
        db: &PgPool,
        engine: &EngineHandle,
        user_id: Uuid,
        request: LogExerciseRequest,
    ) -> Result<ExerciseLogResponse, ApiError> {
        request.validate()?;

        let now = Utc::now();
        let performed_at = request.performed_at.unwrap_or(now);
        validate_event_timestamp(performed_at, now).map_err(ApiError::Validation)?;
        let exercise_type = normalize_exercise_type(&request.exercise_type);
        if exercise_type.is_empty() {
            return Err(ApiError::Validation(
                "exercise type must not be blank".to_string(),
            ));
        }

        let record = ExerciseLogRepository::create(
            db,
            CreateExerciseLog {
                user_id,
                exercise_type,
                duration_minutes: request.duration_minutes,
                calories_burned: request.calories_burned,
                performed_at,
            },
        )
        .await?;

        let xp_awarded = Self::award(
            db,
            engine,
            user_id,
            exercise_xp(record.duration_minutes),
            XpReason::ExerciseLogged {
                minutes: record.duration_minutes,
            },
        )
        .await?;
        engine.notify_data_changed(user_id).await;

        Ok(ExerciseLogResponse {
            id: record.id.to_string(),
            exercise_type: record.exercise_type,
            duration_minutes: record.duration_minutes,
            calories_burned: record.calories_burned,
            performed_at: record.performed_at,
            xp_awarded,
        })
    }

    /// Log water intake
    pub async fn log_water(
        db: &PgPool,
        engine: &EngineHandle,
        user_id: Uuid,
        request: LogWaterRequest,
    ) -> Result<WaterLogResponse, ApiError> {
        request.validate()?;

        let now = Utc::now();
        let consumed_at = request.consumed_at.unwrap_or(now);
        validate_event_timestamp(consumed_at, now).map_err(ApiError::Validation)?;

        let record = WaterLogRepository::create(
            db,
            CreateWaterLog {
                user_id,
                amount_ml: request.amount_ml,
                consumed_at,
            },
        )
        .await?;

        let xp_awarded = Self::award(
            db,
            engine,
            user_id,
            water_xp(record.amount_ml),
            XpReason::WaterLogged {
                amount_ml: record.amount_ml,
            },
        )
        .await?;
        engine.notify_data_changed(user_id).await;

        Ok(WaterLogResponse {
            id: record.id.to_string(),
            amount_ml: record.amount_ml,
            consumed_at: record.consumed_at,
            xp_awarded,
        })
    }

    /// Totals and score for one date, today when unspecified
    pub async fn get_daily_summary(
        db: &PgPool,
        user_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<ActivitySummaryResponse, ApiError> {
        let now = Utc::now();
        let date = date.unwrap_or_else(|| now.date_naive());

        let targets = TargetsService::get_effective(db, user_id).await?;
        let day = ScoreService::assemble_day(db, user_id, date).await?;
        let fasting_active = FastingSessionRepository::get_active(db, user_id)
            .await?
            .is_some();
        let score = score_for_day(&day, &targets, now);

        Ok(ActivitySummaryResponse {
            date,
            total_calories: day.total_calories(),
            total_protein_g: day.total_protein_g(),
            total_carbs_g: day.total_carbs_g(),
            total_fat_g: day.total_fat_g(),
            meal_count: day.food.len(),
            exercise_minutes: day.total_exercise_minutes(),
            exercise_count: day.exercise.len(),
            water_ml: day.total_water_ml(),
            fasting_active,
            score,
        })
    }

    /// Sends the XP award when gamification is on; returns what was granted
    async fn award(
        db: &PgPool,
        engine: &EngineHandle,
        user_id: Uuid,
        amount: i64,
        reason: XpReason,
    ) -> Result<i64, ApiError> {
        if amount <= 0 || !TargetsService::gamification_enabled(db, user_id).await? {
            return Ok(0);
        }
        engine
            .award_xp(XpAward {
                user_id,
                amount,
                reason,
            })
            .await;
        Ok(amount)
    }
}
