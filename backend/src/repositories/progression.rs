//! Progression repository for database operations
//!
//! Write methods take `&mut PgConnection` so the engine can run the whole
//! update chain inside a single transaction. Read methods take `&PgPool`.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

// ============================================================================
// Records
// ============================================================================

/// XP and spendable point balances for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressionStateRecord {
    pub user_id: Uuid,
    pub total_xp: i64,
    pub available_points: i64,
    pub updated_at: DateTime<Utc>,
}

/// Badge row; `unlocked_at IS NULL` means still in progress
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BadgeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub rarity: String,
    pub progress: f64,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Streak row with high-water best count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StreakRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub streak_type: String,
    pub current_count: i32,
    pub best_count: i32,
    pub updated_at: DateTime<Utc>,
}

/// Challenge row scoped to a date window
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChallengeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target: i32,
    pub progress: i32,
    pub xp_reward: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Reward row; unlock and purchase timestamps are both one-way
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RewardRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: String,
    pub cost: i64,
    pub required_level: i32,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub purchased_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Entry in the recent-achievements log
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AchievementRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub achieved_at: DateTime<Utc>,
}

// ============================================================================
// Repository
// ============================================================================

/// Progression repository
pub struct ProgressionRepository;

impl ProgressionRepository {
    // ------------------------------------------------------------------
    // XP state
    // ------------------------------------------------------------------

    /// Create the state row with starting balances if it does not exist,
    /// then return it
    pub async fn ensure_state(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<ProgressionStateRecord> {
        sqlx::query(
            r#"
            INSERT INTO progression_state (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let record = sqlx::query_as::<_, ProgressionStateRecord>(
            r#"
            SELECT user_id, total_xp, available_points, updated_at
            FROM progression_state
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(record)
    }

    /// Read the state row without creating it
    pub async fn get_state(pool: &PgPool, user_id: Uuid) -> Result<Option<ProgressionStateRecord>> {
        let record = sqlx::query_as::<_, ProgressionStateRecord>(
            r#"
            SELECT user_id, total_xp, available_points, updated_at
            FROM progression_state
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Add XP to both the lifetime total and the spendable balance
    pub async fn add_xp(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i64,
    ) -> Result<ProgressionStateRecord> {
        let record = sqlx::query_as::<_, ProgressionStateRecord>(
            r#"
            UPDATE progression_state
            SET total_xp = total_xp + $2,
                available_points = available_points + $2,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, total_xp, available_points, updated_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *conn)
        .await?;

        Ok(record)
    }

    /// Deduct spendable points; lifetime XP is untouched
    pub async fn spend_points(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i64,
    ) -> Result<ProgressionStateRecord> {
        let record = sqlx::query_as::<_, ProgressionStateRecord>(
            r#"
            UPDATE progression_state
            SET available_points = available_points - $2,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, total_xp, available_points, updated_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *conn)
        .await?;

        Ok(record)
    }

    // ------------------------------------------------------------------
    // Badges
    // ------------------------------------------------------------------

    /// List all badges for a user
    pub async fn get_badges(pool: &PgPool, user_id: Uuid) -> Result<Vec<BadgeRecord>> {
        let records = sqlx::query_as::<_, BadgeRecord>(
            r#"
            SELECT id, user_id, name, description, category, rarity, progress,
                   unlocked_at, created_at
            FROM badges
            WHERE user_id = $1
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Insert a badge definition for a user unless it already exists
    pub async fn seed_badge(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        description: &str,
        category: &str,
        rarity: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO badges (user_id, name, description, category, rarity)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, name) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(category)
        .bind(rarity)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Update progress toward a badge that has not unlocked yet
    pub async fn set_badge_progress(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        progress: f64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE badges
            SET progress = $3
            WHERE user_id = $1 AND name = $2 AND unlocked_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(progress)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Unlock a badge. Returns `None` when it was already unlocked, which
    /// makes repeat calls award nothing.
    pub async fn unlock_badge(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<BadgeRecord>> {
        let record = sqlx::query_as::<_, BadgeRecord>(
            r#"
            UPDATE badges
            SET progress = 100, unlocked_at = $3
            WHERE user_id = $1 AND name = $2 AND unlocked_at IS NULL
            RETURNING id, user_id, name, description, category, rarity, progress,
                      unlocked_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    // ------------------------------------------------------------------
    // Streaks
    // ------------------------------------------------------------------

    /// List all streaks for a user
    pub async fn get_streaks(pool: &PgPool, user_id: Uuid) -> Result<Vec<StreakRecord>> {
        let records = sqlx::query_as::<_, StreakRecord>(
            r#"
            SELECT id, user_id, streak_type, current_count, best_count, updated_at
            FROM streaks
            WHERE user_id = $1
            ORDER BY streak_type ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Write the current streak count; the best count only ever rises
    pub async fn upsert_streak(
        conn: &mut PgConnection,
        user_id: Uuid,
        streak_type: &str,
        current: i32,
    ) -> Result<StreakRecord> {
        let record = sqlx::query_as::<_, StreakRecord>(
            r#"
            INSERT INTO streaks (user_id, streak_type, current_count, best_count)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (user_id, streak_type) DO UPDATE SET
                current_count = EXCLUDED.current_count,
                best_count = GREATEST(streaks.best_count, EXCLUDED.current_count),
                updated_at = NOW()
            RETURNING id, user_id, streak_type, current_count, best_count, updated_at
            "#,
        )
        .bind(user_id)
        .bind(streak_type)
        .bind(current)
        .fetch_one(&mut *conn)
        .await?;

        Ok(record)
    }

    // ------------------------------------------------------------------
    // Challenges
    // ------------------------------------------------------------------

    /// Challenges whose window contains the given date
    pub async fn get_current_challenges(
        pool: &PgPool,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<ChallengeRecord>> {
        let records = sqlx::query_as::<_, ChallengeRecord>(
            r#"
            SELECT id, user_id, name, kind, start_date, end_date, target, progress,
                   xp_reward, completed_at, created_at
            FROM challenges
            WHERE user_id = $1 AND start_date <= $2 AND end_date >= $2
            ORDER BY end_date ASC, name ASC
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Insert a challenge for a window unless that window already has it
    pub async fn seed_challenge(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        kind: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        target: i32,
        xp_reward: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO challenges (user_id, name, kind, start_date, end_date, target, xp_reward)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, name, start_date) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(kind)
        .bind(start_date)
        .bind(end_date)
        .bind(target)
        .bind(xp_reward)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Update progress on an open challenge; completed rows stay frozen
    pub async fn set_challenge_progress(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        start_date: NaiveDate,
        progress: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE challenges
            SET progress = $4
            WHERE user_id = $1 AND name = $2 AND start_date = $3 AND completed_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(start_date)
        .bind(progress)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Complete a challenge. Returns `None` when it had already completed,
    /// so the reward is paid exactly once.
    pub async fn complete_challenge(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<ChallengeRecord>> {
        let record = sqlx::query_as::<_, ChallengeRecord>(
            r#"
            UPDATE challenges
            SET progress = target, completed_at = $4
            WHERE user_id = $1 AND name = $2 AND start_date = $3 AND completed_at IS NULL
            RETURNING id, user_id, name, kind, start_date, end_date, target, progress,
                      xp_reward, completed_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(start_date)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    // ------------------------------------------------------------------
    // Rewards
    // ------------------------------------------------------------------

    /// List all rewards for a user
    pub async fn get_rewards(pool: &PgPool, user_id: Uuid) -> Result<Vec<RewardRecord>> {
        let records = sqlx::query_as::<_, RewardRecord>(
            r#"
            SELECT id, user_id, name, kind, cost, required_level, unlocked_at,
                   purchased_at, created_at
            FROM rewards
            WHERE user_id = $1
            ORDER BY required_level ASC, cost ASC, name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Fetch one reward by name inside a transaction
    pub async fn get_reward_by_name(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<RewardRecord>> {
        let record = sqlx::query_as::<_, RewardRecord>(
            r#"
            SELECT id, user_id, name, kind, cost, required_level, unlocked_at,
                   purchased_at, created_at
            FROM rewards
            WHERE user_id = $1 AND name = $2
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    /// Insert a reward definition for a user unless it already exists
    pub async fn seed_reward(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        kind: &str,
        cost: i64,
        required_level: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rewards (user_id, name, kind, cost, required_level)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, name) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(kind)
        .bind(cost)
        .bind(required_level)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Unlock every reward the user's level now covers; returns the rows
    /// that flipped in this call
    pub async fn unlock_eligible_rewards(
        conn: &mut PgConnection,
        user_id: Uuid,
        level: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<RewardRecord>> {
        let records = sqlx::query_as::<_, RewardRecord>(
            r#"
            UPDATE rewards
            SET unlocked_at = $3
            WHERE user_id = $1 AND required_level <= $2 AND unlocked_at IS NULL
            RETURNING id, user_id, name, kind, cost, required_level, unlocked_at,
                      purchased_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(level)
        .bind(now)
        .fetch_all(&mut *conn)
        .await?;

        Ok(records)
    }

    /// Mark an unlocked reward as purchased
    pub async fn mark_reward_purchased(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RewardRecord>> {
        let record = sqlx::query_as::<_, RewardRecord>(
            r#"
            UPDATE rewards
            SET purchased_at = $3
            WHERE user_id = $1 AND name = $2
              AND unlocked_at IS NOT NULL AND purchased_at IS NULL
            RETURNING id, user_id, name, kind, cost, required_level, unlocked_at,
                      purchased_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    // ------------------------------------------------------------------
    // Achievement log
    // ------------------------------------------------------------------

    /// Append to the achievement log and trim it to the newest `cap` rows
    pub async fn log_achievement(
        conn: &mut PgConnection,
        user_id: Uuid,
        message: &str,
        achieved_at: DateTime<Utc>,
        cap: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO achievements (user_id, message, achieved_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(message)
        .bind(achieved_at)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM achievements
            WHERE user_id = $1 AND id NOT IN (
                SELECT id FROM achievements
                WHERE user_id = $1
                ORDER BY achieved_at DESC, id DESC
                LIMIT $2
            )
            "#,
        )
        .bind(user_id)
        .bind(cap)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Recent achievements, newest first
    pub async fn get_achievements(pool: &PgPool, user_id: Uuid) -> Result<Vec<AchievementRecord>> {
        let records = sqlx::query_as::<_, AchievementRecord>(
            r#"
            SELECT id, user_id, message, achieved_at
            FROM achievements
            WHERE user_id = $1
            ORDER BY achieved_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
