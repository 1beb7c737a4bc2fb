//! User targets repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// User targets record from database; NULL means "use the default"
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserTargetsRecord {
    pub user_id: Uuid,
    pub calorie_target: Option<Decimal>,
    pub protein_target_g: Option<Decimal>,
    pub carbs_target_g: Option<Decimal>,
    pub fat_target_g: Option<Decimal>,
    pub daily_water_goal_ml: Option<i32>,
    pub gamification_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

/// Full targets row for upsert; the service merges partial updates into
/// the existing row before writing
#[derive(Debug, Clone)]
pub struct UpsertUserTargets {
    pub user_id: Uuid,
    pub calorie_target: Option<f64>,
    pub protein_target_g: Option<f64>,
    pub carbs_target_g: Option<f64>,
    pub fat_target_g: Option<f64>,
    pub daily_water_goal_ml: Option<i32>,
    pub gamification_enabled: bool,
}

/// User targets repository
pub struct UserTargetsRepository;

impl UserTargetsRepository {
    /// Get a user's configured targets
    pub async fn get(pool: &PgPool, user_id: Uuid) -> Result<Option<UserTargetsRecord>> {
        let record = sqlx::query_as::<_, UserTargetsRecord>(
            r#"
            SELECT user_id, calorie_target, protein_target_g, carbs_target_g, fat_target_g,
                   daily_water_goal_ml, gamification_enabled, updated_at
            FROM user_targets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Insert or replace a user's targets row
    pub async fn upsert(pool: &PgPool, input: UpsertUserTargets) -> Result<UserTargetsRecord> {
        let record = sqlx::query_as::<_, UserTargetsRecord>(
            r#"
            INSERT INTO user_targets
                (user_id, calorie_target, protein_target_g, carbs_target_g, fat_target_g,
                 daily_water_goal_ml, gamification_enabled, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                calorie_target = EXCLUDED.calorie_target,
                protein_target_g = EXCLUDED.protein_target_g,
                carbs_target_g = EXCLUDED.carbs_target_g,
                fat_target_g = EXCLUDED.fat_target_g,
                daily_water_goal_ml = EXCLUDED.daily_water_goal_ml,
                gamification_enabled = EXCLUDED.gamification_enabled,
                updated_at = NOW()
            RETURNING user_id, calorie_target, protein_target_g, carbs_target_g, fat_target_g,
                      daily_water_goal_ml, gamification_enabled, updated_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.calorie_target)
        .bind(input.protein_target_g)
        .bind(input.carbs_target_g)
        .bind(input.fat_target_g)
        .bind(input.daily_water_goal_ml)
        .bind(input.gamification_enabled)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }
}
