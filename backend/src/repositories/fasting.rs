//! Fasting session repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Fasting session record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FastingSessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub target_hours: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for starting a fasting session
#[derive(Debug, Clone)]
pub struct CreateFastingSession {
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub target_hours: i32,
}

/// Fasting session repository
pub struct FastingSessionRepository;

impl FastingSessionRepository {
    /// Start a new fasting session
    pub async fn create(
        pool: &PgPool,
        input: CreateFastingSession,
    ) -> Result<FastingSessionRecord> {
        let record = sqlx::query_as::<_, FastingSessionRecord>(
            r#"
            INSERT INTO fasting_sessions (user_id, started_at, target_hours)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, started_at, ended_at, target_hours, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.started_at)
        .bind(input.target_hours)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Get the currently running session, if any
    pub async fn get_active(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<FastingSessionRecord>> {
        let record = sqlx::query_as::<_, FastingSessionRecord>(
            r#"
            SELECT id, user_id, started_at, ended_at, target_hours, created_at
            FROM fasting_sessions
            WHERE user_id = $1 AND ended_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// End the currently running session. Returns None when no session is
    /// active.
    pub async fn end_active(
        pool: &PgPool,
        user_id: Uuid,
        ended_at: DateTime<Utc>,
    ) -> Result<Option<FastingSessionRecord>> {
        let record = sqlx::query_as::<_, FastingSessionRecord>(
            r#"
            UPDATE fasting_sessions
            SET ended_at = $2
            WHERE user_id = $1 AND ended_at IS NULL
            RETURNING id, user_id, started_at, ended_at, target_hours, created_at
            "#,
        )
        .bind(user_id)
        .bind(ended_at)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Sessions that started on a specific date, plus the active one if it
    /// is still running (whenever it started)
    pub async fn get_for_day(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<FastingSessionRecord>> {
        let records = sqlx::query_as::<_, FastingSessionRecord>(
            r#"
            SELECT id, user_id, started_at, ended_at, target_hours, created_at
            FROM fasting_sessions
            WHERE user_id = $1 AND (DATE(started_at) = $2 OR ended_at IS NULL)
            ORDER BY started_at DESC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Sessions that started within a date range (inclusive)
    pub async fn get_started_in_range(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FastingSessionRecord>> {
        let records = sqlx::query_as::<_, FastingSessionRecord>(
            r#"
            SELECT id, user_id, started_at, ended_at, target_hours, created_at
            FROM fasting_sessions
            WHERE user_id = $1 AND DATE(started_at) >= $2 AND DATE(started_at) <= $3
            ORDER BY started_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Most recent completed sessions, newest start first
    pub async fn get_recent_completed(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<FastingSessionRecord>> {
        let records = sqlx::query_as::<_, FastingSessionRecord>(
            r#"
            SELECT id, user_id, started_at, ended_at, target_hours, created_at
            FROM fasting_sessions
            WHERE user_id = $1 AND ended_at IS NOT NULL
            ORDER BY started_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Completed sessions that started on or after `start`, newest start
    /// first
    pub async fn get_completed_since(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
    ) -> Result<Vec<FastingSessionRecord>> {
        let records = sqlx::query_as::<_, FastingSessionRecord>(
            r#"
            SELECT id, user_id, started_at, ended_at, target_hours, created_at
            FROM fasting_sessions
            WHERE user_id = $1 AND ended_at IS NOT NULL AND DATE(started_at) >= $2
            ORDER BY started_at DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Every session for a user, oldest start first
    pub async fn get_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<FastingSessionRecord>> {
        let records = sqlx::query_as::<_, FastingSessionRecord>(
            r#"
            SELECT id, user_id, started_at, ended_at, target_hours, created_at
            FROM fasting_sessions
            WHERE user_id = $1
            ORDER BY started_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Total completed sessions for a user
    pub async fn count_completed(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)::bigint
            FROM fasting_sessions
            WHERE user_id = $1 AND ended_at IS NOT NULL
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count.0)
    }
}
