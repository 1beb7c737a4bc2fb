//! Food log repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Food log record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FoodLogRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub calories: Decimal,
    pub protein_g: Decimal,
    pub carbs_g: Decimal,
    pub fat_g: Decimal,
    pub consumed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a food log
#[derive(Debug, Clone)]
pub struct CreateFoodLog {
    pub user_id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub consumed_at: DateTime<Utc>,
}

/// Per-day food aggregate
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyFoodSummary {
    pub date: NaiveDate,
    pub entry_count: i64,
}

/// Food log repository
pub struct FoodLogRepository;

impl FoodLogRepository {
    /// Create a new food log entry
    pub async fn create(pool: &PgPool, input: CreateFoodLog) -> Result<FoodLogRecord> {
        let record = sqlx::query_as::<_, FoodLogRecord>(
            r#"
            INSERT INTO food_logs (user_id, name, calories, protein_g, carbs_g, fat_g, consumed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, calories, protein_g, carbs_g, fat_g, consumed_at, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.name)
        .bind(input.calories)
        .bind(input.protein_g)
        .bind(input.carbs_g)
        .bind(input.fat_g)
        .bind(input.consumed_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Get food logs for a specific date
    pub async fn get_by_date(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<FoodLogRecord>> {
        let records = sqlx::query_as::<_, FoodLogRecord>(
            r#"
            SELECT id, user_id, name, calories, protein_g, carbs_g, fat_g, consumed_at, created_at
            FROM food_logs
            WHERE user_id = $1 AND DATE(consumed_at) = $2
            ORDER BY consumed_at ASC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Get food logs within a date range (inclusive)
    pub async fn get_by_date_range(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FoodLogRecord>> {
        let records = sqlx::query_as::<_, FoodLogRecord>(
            r#"
            SELECT id, user_id, name, calories, protein_g, carbs_g, fat_g, consumed_at, created_at
            FROM food_logs
            WHERE user_id = $1 AND DATE(consumed_at) >= $2 AND DATE(consumed_at) <= $3
            ORDER BY consumed_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Entry counts per day within a date range
    pub async fn get_daily_counts(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyFoodSummary>> {
        let summaries = sqlx::query_as::<_, DailyFoodSummary>(
            r#"
            SELECT DATE(consumed_at) as date, COUNT(*)::bigint as entry_count
            FROM food_logs
            WHERE user_id = $1 AND DATE(consumed_at) >= $2 AND DATE(consumed_at) <= $3
            GROUP BY DATE(consumed_at)
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }

    /// Total entries ever logged by a user
    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)::bigint
            FROM food_logs
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count.0)
    }
}
