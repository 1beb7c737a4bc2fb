//! Water log repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Water log record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WaterLogRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_ml: i32,
    pub consumed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a water log
#[derive(Debug, Clone)]
pub struct CreateWaterLog {
    pub user_id: Uuid,
    pub amount_ml: i32,
    pub consumed_at: DateTime<Utc>,
}

/// Per-day water aggregate
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyWaterSummary {
    pub date: NaiveDate,
    pub total_ml: i64,
    pub entry_count: i64,
}

/// Water log repository
pub struct WaterLogRepository;

impl WaterLogRepository {
    /// Create a new water log entry
    pub async fn create(pool: &PgPool, input: CreateWaterLog) -> Result<WaterLogRecord> {
        let record = sqlx::query_as::<_, WaterLogRecord>(
            r#"
            INSERT INTO water_logs (user_id, amount_ml, consumed_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, amount_ml, consumed_at, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.amount_ml)
        .bind(input.consumed_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Get water logs for a specific date
    pub async fn get_by_date(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<WaterLogRecord>> {
        let records = sqlx::query_as::<_, WaterLogRecord>(
            r#"
            SELECT id, user_id, amount_ml, consumed_at, created_at
            FROM water_logs
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

    /// Get water logs within a date range (inclusive)
    pub async fn get_by_date_range(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WaterLogRecord>> {
        let records = sqlx::query_as::<_, WaterLogRecord>(
            r#"
            SELECT id, user_id, amount_ml, consumed_at, created_at
            FROM water_logs
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

    /// Totals and entry counts per day within a date range
    pub async fn get_daily_summaries(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWaterSummary>> {
        let summaries = sqlx::query_as::<_, DailyWaterSummary>(
            r#"
            SELECT DATE(consumed_at) as date,
                   COALESCE(SUM(amount_ml), 0)::bigint as total_ml,
                   COUNT(*)::bigint as entry_count
            FROM water_logs
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
}
