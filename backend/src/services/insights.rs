//! Insight service - rule evaluation over recent activity
//!
//! Reads are answered from the freshest source available: the engine's
//! in-memory snapshot, then the Redis cache, then a direct computation
//! that also refills the cache. Redis being down only costs the caching.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Timelike, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::repositories::{
    ExerciseLogRepository, FastingSessionRepository, FoodLogRepository, WaterLogRepository,
};
use crate::services::engine::SnapshotStore;
use crate::services::score::fasting_session;
use wellspring_shared::insights::{
    generate_insights, DailySample, CORRELATION_WINDOW_DAYS, SHORT_WINDOW_DAYS,
};
use wellspring_shared::{FastingSession, InsightsResponse, SmartInsight};

/// Most recent completed fasts considered by the fasting success rule
const FASTING_SAMPLE_LIMIT: i64 = 100;

fn cache_key(user_id: Uuid) -> String {
    format!("insights:{}", user_id)
}

/// Insight service
pub struct InsightService;

impl InsightService {
    /// Zero-filled per-day samples covering the full correlation window,
    /// oldest first
    async fn sample_window(
        db: &PgPool,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<DailySample>, ApiError> {
        let start = today - Duration::days(CORRELATION_WINDOW_DAYS as i64 - 1);

        let food = FoodLogRepository::get_daily_counts(db, user_id, start, today).await?;
        let exercise = ExerciseLogRepository::get_daily_summaries(db, user_id, start, today).await?;
        let water = WaterLogRepository::get_daily_summaries(db, user_id, start, today).await?;

        let mut by_date: BTreeMap<NaiveDate, DailySample> = (0..CORRELATION_WINDOW_DAYS as i64)
            .map(|offset| {
                let date = start + Duration::days(offset);
                (
                    date,
                    DailySample {
                        date,
                        ..DailySample::default()
                    },
                )
            })
            .collect();

        for summary in food {
            if let Some(sample) = by_date.get_mut(&summary.date) {
                sample.food_entries = summary.entry_count.max(0) as u32;
            }
        }
        for summary in exercise {
            if let Some(sample) = by_date.get_mut(&summary.date) {
                sample.exercise_entries = summary.entry_count.max(0) as u32;
                sample.exercise_minutes = summary.total_minutes;
            }
        }
        for summary in water {
            if let Some(sample) = by_date.get_mut(&summary.date) {
                sample.water_entries = summary.entry_count.max(0) as u32;
                sample.water_ml = summary.total_ml;
            }
        }

        Ok(by_date.into_values().collect())
    }

    /// Runs every rule against freshly assembled activity windows
    pub(crate) async fn compute_insights(
        db: &PgPool,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<SmartInsight>, ApiError> {
        let samples = Self::sample_window(db, user_id, today).await?;

        let meal_window_start = today - Duration::days(SHORT_WINDOW_DAYS - 1);
        let meal_hours: Vec<u32> =
            FoodLogRepository::get_by_date_range(db, user_id, meal_window_start, today)
                .await?
                .iter()
                .map(|record| record.consumed_at.hour())
                .collect();

        let fasts: Vec<FastingSession> =
            FastingSessionRepository::get_recent_completed(db, user_id, FASTING_SAMPLE_LIMIT)
                .await?
                .iter()
                .map(fasting_session)
                .collect();

        Ok(generate_insights(&samples, &meal_hours, &fasts, today))
    }

    /// Ranked insights for a user: snapshot, then cache, then computed
    pub async fn get_insights(
        db: &PgPool,
        redis: Option<ConnectionManager>,
        snapshots: &SnapshotStore,
        cache_secs: u64,
        user_id: Uuid,
    ) -> Result<InsightsResponse, ApiError> {
        if let Some(snapshot) = snapshots.read().await.get(&user_id).cloned() {
            return Ok(InsightsResponse {
                insights: snapshot.insights.clone(),
                generated_at: snapshot.generated_at,
            });
        }

        if let Some(cached) = Self::cache_get(redis.clone(), user_id).await {
            return Ok(cached);
        }

        let today = Utc::now().date_naive();
        let insights = Self::compute_insights(db, user_id, today).await?;
        let response = InsightsResponse {
            insights,
            generated_at: Utc::now(),
        };
        Self::cache_put(redis, user_id, &response, cache_secs).await;
        Ok(response)
    }

    pub(crate) async fn cache_get(
        redis: Option<ConnectionManager>,
        user_id: Uuid,
    ) -> Option<InsightsResponse> {
        let mut conn = redis?;
        match conn.get::<_, Option<String>>(cache_key(user_id)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(response) => {
                    debug!("insight cache hit for {}", user_id);
                    Some(response)
                }
                Err(err) => {
                    warn!("discarding unreadable cached insights: {}", err);
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("insight cache read failed: {}", err);
                None
            }
        }
    }

    pub(crate) async fn cache_put(
        redis: Option<ConnectionManager>,
        user_id: Uuid,
        response: &InsightsResponse,
        cache_secs: u64,
    ) {
        let Some(mut conn) = redis else {
            return;
        };
        let raw = match serde_json::to_string(response) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("failed to serialize insights for cache: {}", err);
                return;
            }
        };
        if let Err(err) = conn
            .set_ex::<_, _, ()>(cache_key(user_id), raw, cache_secs)
            .await
        {
            warn!("insight cache write failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_per_user() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(cache_key(a), cache_key(b));
        assert!(cache_key(a).starts_with("insights:"));
    }
}
