//! Exercise log repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Exercise log record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExerciseLogRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_type: String,
    pub duration_minutes: i32,
    pub calories_burned: Option<i32>,
    pub performed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an exercise log
#[derive(Debug, Clone)]
pub struct CreateExerciseLog {
    pub user_id: Uuid,
    pub exercise_type: String,
    pub duration_minutes: i32,
    pub calories_burned: Option<i32>,
    pub performed_at: DateTime<Utc>,
}

/// Per-day exercise aggregate
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyExerciseSummary {
    pub date: NaiveDate,
    pub total_minutes: i64,
    pub entry_count: i64,
}

/// Exercise log repository
pub struct ExerciseLogRepository;

impl ExerciseLogRepository {
    /// Create a new exercise log entry
    pub async fn create(pool: &PgPool, input: CreateExerciseLog) -> Result<ExerciseLogRecord> {
        let record = sqlx::query_as::<_, ExerciseLogRecord>(
            r#"
            INSERT INTO exercise_logs (user_id, exercise_type, duration_minutes, calories_burned, performed_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, exercise_type, duration_minutes, calories_burned, performed_at, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.exercise_type)
        .bind(input.duration_minutes)
        .bind(input.calories_burned)
        .bind(input.performed_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Get exercise logs for a specific date
    pub async fn get_by_date(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ExerciseLogRecord>> {
        let records = sqlx::query_as::<_, ExerciseLogRecord>(
            r#"
            SELECT id, user_id, exercise_type, duration_minutes, calories_burned, performed_at, created_at
            FROM exercise_logs
            WHERE user_id = $1 AND DATE(performed_at) = $2
            ORDER BY performed_at ASC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Get exercise logs within a date range (inclusive)
    pub async fn get_by_date_range(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExerciseLogRecord>> {
        let records = sqlx::query_as::<_, ExerciseLogRecord>(
            r#"
            SELECT id, user_id, exercise_type, duration_minutes, calories_burned, performed_at, created_at
            FROM exercise_logs
            WHERE user_id = $1 AND DATE(performed_at) >= $2 AND DATE(performed_at) <= $3
            ORDER BY performed_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Minutes and entry counts per day within a date range
    pub async fn get_daily_summaries(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyExerciseSummary>> {
        let summaries = sqlx::query_as::<_, DailyExerciseSummary>(
            r#"
            SELECT DATE(performed_at) as date,
                   COALESCE(SUM(duration_minutes), 0)::bigint as total_minutes,
                   COUNT(*)::bigint as entry_count
            FROM exercise_logs
            WHERE user_id = $1 AND DATE(performed_at) >= $2 AND DATE(performed_at) <= $3
            GROUP BY DATE(performed_at)
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
            FROM exercise_logs
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count.0)
    }

    /// Number of distinct exercise types a user has ever logged
    pub async fn count_distinct_types(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT exercise_type)::bigint
            FROM exercise_logs
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count.0)
    }
}
