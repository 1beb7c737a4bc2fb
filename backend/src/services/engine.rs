//! Engine worker - the single writer for progression state
//!
//! One task owns every gamification write. XP awards apply immediately in
//! arrival order; data-change notifications are debounced per user and
//! collapse into one recompute that runs the full update chain (badges,
//! streaks, challenges, reward unlocks) inside a single transaction, then
//! publishes a fresh analytics snapshot. Purchases run through the same
//! task so balance checks never race an award.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use redis::aio::ConnectionManager;
use sqlx::{PgConnection, PgPool};
use tokio::sync::{watch, RwLock};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{ApiError, ApiResult};
use crate::events::{EngineEvent, EngineRx, PurchaseOutcome, XpAward};
use crate::repositories::{
    ExerciseLogRepository, FastingSessionRepository, FoodLogRepository, ProgressionRepository,
    ProgressionStateRecord,
};
use crate::services::insights::InsightService;
use crate::services::progression::{
    badge_progress, challenge_progress, challenge_window, qualifying_dates,
    qualifying_fasts_in_window, reward_from_record, BadgeCounts, ProgressionService,
    BADGE_CATALOG, CHALLENGE_CATALOG, REWARD_CATALOG,
};
use crate::services::score::{fasting_session, ScoreService};
use crate::services::targets::TargetsService;
use wellspring_shared::progression::{
    fasting_session_streak, level_for_xp, level_title, level_up_bonus, walk_back_streak,
    ACHIEVEMENT_LOG_CAP, FASTING_GAP_TOLERANCE_DAYS, MAX_STREAK_LOOKBACK_DAYS,
};
use wellspring_shared::{
    FastingSession, HealthScore, InsightsResponse, ProgressionError, SmartInsight, StreakType,
    UserTargets,
};

const LOG_CAP: i64 = ACHIEVEMENT_LOG_CAP as i64;

/// Published analytics for one user, rebuilt on every recompute
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshot {
    pub user_id: Uuid,
    pub insights: Vec<SmartInsight>,
    pub today: HealthScore,
    pub generated_at: DateTime<Utc>,
}

/// Shared map of the latest snapshot per user
pub type SnapshotStore = Arc<RwLock<HashMap<Uuid, Arc<AnalyticsSnapshot>>>>;

pub fn new_snapshot_store() -> SnapshotStore {
    Arc::new(RwLock::new(HashMap::new()))
}

struct Engine {
    db: PgPool,
    config: EngineConfig,
    snapshots: SnapshotStore,
    redis: Option<ConnectionManager>,
    revision: watch::Sender<u64>,
}

/// Consumes the event bus until every sender is gone. Spawn this once at
/// startup.
pub async fn run(
    db: PgPool,
    config: EngineConfig,
    rx: EngineRx,
    snapshots: SnapshotStore,
    redis: Option<ConnectionManager>,
) {
    let EngineRx {
        mut events,
        revision,
    } = rx;
    let debounce = StdDuration::from_millis(config.debounce_ms);
    let engine = Engine {
        db,
        config,
        snapshots,
        redis,
        revision,
    };

    let mut pending: HashMap<Uuid, Instant> = HashMap::new();
    info!("Engine worker started (debounce {}ms)", debounce.as_millis());

    loop {
        let next_deadline = pending.values().min().copied();
        tokio::select! {
            event = events.recv() => match event {
                Some(EngineEvent::XpAwarded(award)) => engine.apply_award(award).await,
                Some(EngineEvent::DataChanged { user_id }) => {
                    pending.insert(user_id, Instant::now() + debounce);
                }
                Some(EngineEvent::PurchaseReward { user_id, reward_name, reply }) => {
                    let outcome = engine.handle_purchase(user_id, &reward_name).await;
                    if reply.send(outcome).is_err() {
                        warn!("Purchase caller went away before the reply");
                    }
                }
                None => break,
            },
            _ = sleep_until(next_deadline.unwrap_or_else(Instant::now)), if next_deadline.is_some() => {
                let now = Instant::now();
                let due: Vec<Uuid> = pending
                    .iter()
                    .filter(|(_, deadline)| **deadline <= now)
                    .map(|(user_id, _)| *user_id)
                    .collect();
                for user_id in due {
                    pending.remove(&user_id);
                    engine.recompute_user(user_id).await;
                }
            }
        }
    }

    // The bus is closed; flush whatever was still debouncing
    for user_id in pending.into_keys() {
        engine.recompute_user(user_id).await;
    }
    info!("Engine worker stopped");
}

impl Engine {
    // ------------------------------------------------------------------
    // XP awards
    // ------------------------------------------------------------------

    async fn apply_award(&self, award: XpAward) {
        debug!(
            "Applying {} XP to {} ({})",
            award.amount, award.user_id, award.reason
        );
        if let Err(err) = self.try_apply_award(&award).await {
            error!("Failed to apply XP award for {}: {}", award.user_id, err);
        }
    }

    async fn try_apply_award(&self, award: &XpAward) -> Result<(), ApiError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let state = Self::grant_xp(&mut tx, award.user_id, award.amount, now).await?;
        let level = level_for_xp(state.total_xp);
        let unlocked =
            ProgressionRepository::unlock_eligible_rewards(&mut tx, award.user_id, level, now)
                .await?;
        for reward in &unlocked {
            ProgressionRepository::log_achievement(
                &mut tx,
                award.user_id,
                &format!("Unlocked reward: {}", reward.name),
                now,
                LOG_CAP,
            )
            .await?;
        }

        tx.commit().await?;
        metrics::counter!("engine_xp_awarded_total").increment(award.amount.max(0) as u64);
        Ok(())
    }

    /// Adds XP and pays out level-up bonuses until the level stops moving.
    /// A single bonus can never reach the next threshold, so the loop only
    /// iterates more than once after a very large grant.
    async fn grant_xp(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<ProgressionStateRecord, ApiError> {
        let before = ProgressionRepository::ensure_state(conn, user_id).await?;
        let mut state = ProgressionRepository::add_xp(conn, user_id, amount).await?;

        let mut granted_up_to = level_for_xp(before.total_xp);
        loop {
            let current = level_for_xp(state.total_xp);
            if current <= granted_up_to {
                break;
            }
            for level in (granted_up_to + 1)..=current {
                state = ProgressionRepository::add_xp(conn, user_id, level_up_bonus(level)).await?;
                ProgressionRepository::log_achievement(
                    conn,
                    user_id,
                    &format!("Reached Level {} - {}", level, level_title(level)),
                    now,
                    LOG_CAP,
                )
                .await?;
                info!("User {} reached level {}", user_id, level);
            }
            granted_up_to = current;
        }

        Ok(state)
    }

    // ------------------------------------------------------------------
    // Purchases
    // ------------------------------------------------------------------

    async fn handle_purchase(&self, user_id: Uuid, reward_name: &str) -> ApiResult<PurchaseOutcome> {
        if !TargetsService::gamification_enabled(&self.db, user_id).await? {
            return Err(ProgressionError::GamificationDisabled.into());
        }

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let state = ProgressionRepository::ensure_state(&mut tx, user_id).await?;
        Self::seed_catalogs(&mut tx, user_id, now.date_naive()).await?;

        let record = ProgressionRepository::get_reward_by_name(&mut tx, user_id, reward_name)
            .await?
            .ok_or_else(|| ProgressionError::UnknownReward {
                name: reward_name.to_string(),
            })?;
        let mut reward = reward_from_record(&record).ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("stored reward {} does not parse", record.name))
        })?;

        reward.purchase(state.available_points, now)?;

        let new_state = ProgressionRepository::spend_points(&mut tx, user_id, reward.cost).await?;
        ProgressionRepository::mark_reward_purchased(&mut tx, user_id, &record.name, now).await?;
        ProgressionRepository::log_achievement(
            &mut tx,
            user_id,
            &format!("Purchased {}", record.name),
            now,
            LOG_CAP,
        )
        .await?;

        tx.commit().await?;
        info!("User {} purchased {}", user_id, record.name);

        Ok(PurchaseOutcome {
            reward,
            available_points: new_state.available_points,
        })
    }

    // ------------------------------------------------------------------
    // Debounced recompute
    // ------------------------------------------------------------------

    async fn recompute_user(&self, user_id: Uuid) {
        let started = Instant::now();
        match self.try_recompute(user_id).await {
            Ok(()) => {
                metrics::counter!("engine_recomputes_total").increment(1);
                metrics::histogram!("engine_recompute_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                debug!("Recomputed published state for {}", user_id);
            }
            Err(err) => error!("Recompute failed for {}: {}", user_id, err),
        }
    }

    async fn try_recompute(&self, user_id: Uuid) -> Result<(), ApiError> {
        let now = Utc::now();
        let today = now.date_naive();
        let targets = TargetsService::get_effective(&self.db, user_id).await?;

        if targets.gamification_enabled {
            self.update_progression(user_id, &targets, today, now).await?;
        }
        self.publish_analytics(user_id, today, now).await
    }

    /// The full update chain: badges, streaks, challenges, then reward
    /// unlocks, committed together
    async fn update_progression(
        &self,
        user_id: Uuid,
        targets: &UserTargets,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let lookback_start = today - Duration::days(MAX_STREAK_LOOKBACK_DAYS as i64);
        let days =
            ProgressionService::collect_activity_days(&self.db, user_id, lookback_start, today)
                .await?;
        let completed_fasts: Vec<FastingSession> =
            FastingSessionRepository::get_completed_since(&self.db, user_id, lookback_start)
                .await?
                .iter()
                .map(fasting_session)
                .collect();
        let fast_starts: Vec<NaiveDate> = completed_fasts
            .iter()
            .map(|session| session.started_at.date_naive())
            .collect();

        let water_goal = targets.effective_water_goal_ml();
        let logging_streak =
            walk_back_streak(&qualifying_dates(&days, StreakType::DailyLogging, water_goal), today);
        let exercise_streak =
            walk_back_streak(&qualifying_dates(&days, StreakType::Exercise, water_goal), today);
        let hydration_streak =
            walk_back_streak(&qualifying_dates(&days, StreakType::Hydration, water_goal), today);
        let consistency_streak =
            walk_back_streak(&qualifying_dates(&days, StreakType::Consistency, water_goal), today);
        // A fasting streak is only current while the newest completed fast
        // is inside the gap tolerance
        let fasting_streak = match fast_starts.first() {
            Some(latest) if (today - *latest).num_days() <= FASTING_GAP_TOLERANCE_DAYS => {
                fasting_session_streak(&fast_starts)
            }
            _ => 0,
        };

        let counts = BadgeCounts {
            food_logs: FoodLogRepository::count_for_user(&self.db, user_id).await?,
            exercise_logs: ExerciseLogRepository::count_for_user(&self.db, user_id).await?,
            distinct_exercise_types: ExerciseLogRepository::count_distinct_types(&self.db, user_id)
                .await?,
            completed_fasts: FastingSessionRepository::count_completed(&self.db, user_id).await?,
            logging_streak,
            exercise_streak,
            hydration_streak,
        };

        let mut tx = self.db.begin().await?;
        ProgressionRepository::ensure_state(&mut tx, user_id).await?;
        Self::seed_catalogs(&mut tx, user_id, today).await?;

        for def in BADGE_CATALOG {
            let progress = badge_progress(def, &counts);
            if progress >= 100.0 {
                if let Some(badge) =
                    ProgressionRepository::unlock_badge(&mut tx, user_id, def.name, now).await?
                {
                    Self::grant_xp(&mut tx, user_id, def.rarity.xp_reward(), now).await?;
                    ProgressionRepository::log_achievement(
                        &mut tx,
                        user_id,
                        &format!("Unlocked badge: {}", badge.name),
                        now,
                        LOG_CAP,
                    )
                    .await?;
                    metrics::counter!("badges_unlocked_total").increment(1);
                    info!("User {} unlocked badge {}", user_id, badge.name);
                }
            } else {
                ProgressionRepository::set_badge_progress(&mut tx, user_id, def.name, progress)
                    .await?;
            }
        }

        for (streak_type, current) in [
            (StreakType::DailyLogging, logging_streak),
            (StreakType::Exercise, exercise_streak),
            (StreakType::Hydration, hydration_streak),
            (StreakType::Fasting, fasting_streak),
            (StreakType::Consistency, consistency_streak),
        ] {
            ProgressionRepository::upsert_streak(&mut tx, user_id, &streak_type.to_string(), current)
                .await?;
        }

        for def in CHALLENGE_CATALOG {
            let window = challenge_window(def.cadence, today);
            let fasts_in_window = qualifying_fasts_in_window(&completed_fasts, window);
            let progress =
                challenge_progress(def.kind, &days, fasts_in_window, window, water_goal);
            if progress >= def.target {
                if let Some(challenge) = ProgressionRepository::complete_challenge(
                    &mut tx, user_id, def.name, window.0, now,
                )
                .await?
                {
                    Self::grant_xp(&mut tx, user_id, challenge.xp_reward, now).await?;
                    ProgressionRepository::log_achievement(
                        &mut tx,
                        user_id,
                        &format!("Completed challenge: {}", challenge.name),
                        now,
                        LOG_CAP,
                    )
                    .await?;
                    metrics::counter!("challenges_completed_total").increment(1);
                    info!("User {} completed challenge {}", user_id, challenge.name);
                }
            } else {
                ProgressionRepository::set_challenge_progress(
                    &mut tx, user_id, def.name, window.0, progress,
                )
                .await?;
            }
        }

        let state = ProgressionRepository::ensure_state(&mut tx, user_id).await?;
        let level = level_for_xp(state.total_xp);
        let newly_unlocked =
            ProgressionRepository::unlock_eligible_rewards(&mut tx, user_id, level, now).await?;
        for reward in &newly_unlocked {
            ProgressionRepository::log_achievement(
                &mut tx,
                user_id,
                &format!("Unlocked reward: {}", reward.name),
                now,
                LOG_CAP,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Rebuilds the snapshot, refreshes the cache, and bumps the revision
    async fn publish_analytics(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let insights = InsightService::compute_insights(&self.db, user_id, today).await?;
        let score = ScoreService::get_score(&self.db, user_id, Some(today)).await?;

        let snapshot = Arc::new(AnalyticsSnapshot {
            user_id,
            insights: insights.clone(),
            today: score,
            generated_at: now,
        });
        self.snapshots.write().await.insert(user_id, snapshot);

        InsightService::cache_put(
            self.redis.clone(),
            user_id,
            &InsightsResponse {
                insights,
                generated_at: now,
            },
            self.config.insight_cache_secs,
        )
        .await;

        self.revision.send_modify(|rev| *rev += 1);
        Ok(())
    }

    async fn seed_catalogs(
        conn: &mut PgConnection,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<(), ApiError> {
        for def in BADGE_CATALOG {
            ProgressionRepository::seed_badge(
                conn,
                user_id,
                def.name,
                def.description,
                &def.category.to_string(),
                &def.rarity.to_string(),
            )
            .await?;
        }
        for def in CHALLENGE_CATALOG {
            let (start, end) = challenge_window(def.cadence, today);
            ProgressionRepository::seed_challenge(
                conn,
                user_id,
                def.name,
                &def.kind.to_string(),
                start,
                end,
                def.target,
                def.xp_reward,
            )
            .await?;
        }
        for def in REWARD_CATALOG {
            ProgressionRepository::seed_reward(
                conn,
                user_id,
                def.name,
                &def.kind.to_string(),
                def.cost,
                def.required_level,
            )
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::bus;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn test_worker_stops_when_bus_closes() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/wellspring_test")
            .unwrap();
        let (handle, rx) = bus();
        let store = new_snapshot_store();

        let worker = tokio::spawn(run(pool, EngineConfig::default(), rx, store, None));
        drop(handle);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_store_swaps_per_user() {
        let store = new_snapshot_store();
        let user_id = Uuid::new_v4();
        let score = HealthScore::from_components(Utc::now().date_naive(), 50.0, 50.0, 50.0, 50.0);

        let first = Arc::new(AnalyticsSnapshot {
            user_id,
            insights: vec![],
            today: score.clone(),
            generated_at: Utc::now(),
        });
        store.write().await.insert(user_id, first);

        let second = Arc::new(AnalyticsSnapshot {
            user_id,
            insights: vec![],
            today: score,
            generated_at: Utc::now(),
        });
        store.write().await.insert(user_id, Arc::clone(&second));

        let read = store.read().await.get(&user_id).cloned().unwrap();
        assert_eq!(read.generated_at, second.generated_at);
    }
}
