//! Fasting service - session lifecycle and completion XP
//!
//! One active session per user, enforced both here and by a partial unique
//! index. XP is granted only when a session ends, scaled by how long it ran.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::events::{EngineHandle, XpAward, XpReason};
use crate::repositories::{CreateFastingSession, FastingSessionRecord, FastingSessionRepository};
use crate::services::score::fasting_session;
use crate::services::targets::TargetsService;
use wellspring_shared::progression::fasting_xp;
use wellspring_shared::validation::validate_event_timestamp;
use wellspring_shared::{FastingError, FastingSessionResponse, StartFastRequest};

fn session_response(
    record: &FastingSessionRecord,
    now: DateTime<Utc>,
    xp_awarded: i64,
) -> FastingSessionResponse {
    let session = fasting_session(record);
    let is_active = session.is_active();
    let elapsed_hours = if is_active {
        session.elapsed_hours(now)
    } else {
        session.actual_hours().unwrap_or(0.0)
    };
    let met_target = if is_active {
        None
    } else {
        Some(session.met_target())
    };

    FastingSessionResponse {
        id: record.id.to_string(),
        started_at: record.started_at,
        ended_at: record.ended_at,
        target_hours: record.target_hours,
        elapsed_hours,
        is_active,
        met_target,
        xp_awarded,
    }
}

/// Fasting service
pub struct FastingService;

impl FastingService {
    /// Start a fasting session; fails while one is already running
    pub async fn start_fast(
        db: &PgPool,
        engine: &EngineHandle,
        user_id: Uuid,
        request: StartFastRequest,
    ) -> Result<FastingSessionResponse, ApiError> {
        request.validate()?;

        let now = Utc::now();
        let started_at = request.started_at.unwrap_or(now);
        validate_event_timestamp(started_at, now).map_err(ApiError::Validation)?;

        if FastingSessionRepository::get_active(db, user_id)
            .await?
            .is_some()
        {
            return Err(FastingError::SessionAlreadyActive.into());
        }

        let record = FastingSessionRepository::create(
            db,
            CreateFastingSession {
                user_id,
                started_at,
                target_hours: request.target_hours,
            },
        )
        .await?;

        engine.notify_data_changed(user_id).await;

        Ok(session_response(&record, now, 0))
    }

    /// End the active session and grant completion XP
    pub async fn end_fast(
        db: &PgPool,
        engine: &EngineHandle,
        user_id: Uuid,
    ) -> Result<FastingSessionResponse, ApiError> {
        let now = Utc::now();
        let record = FastingSessionRepository::end_active(db, user_id, now)
            .await?
            .ok_or(FastingError::NoActiveSession)?;

        let session = fasting_session(&record);
        let hours = session.actual_hours().unwrap_or(0.0);

        let mut xp_awarded = fasting_xp(hours);
        if xp_awarded > 0 && TargetsService::gamification_enabled(db, user_id).await? {
            engine
                .award_xp(XpAward {
                    user_id,
                    amount: xp_awarded,
                    reason: XpReason::FastCompleted { hours },
                })
                .await;
        } else {
            xp_awarded = 0;
        }
        engine.notify_data_changed(user_id).await;

        Ok(session_response(&record, now, xp_awarded))
    }

    /// The active session, or the most recently completed one
    pub async fn get_status(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<FastingSessionResponse, ApiError> {
        let now = Utc::now();

        if let Some(active) = FastingSessionRepository::get_active(db, user_id).await? {
            return Ok(session_response(&active, now, 0));
        }

        let recent = FastingSessionRepository::get_recent_completed(db, user_id, 1).await?;
        recent
            .first()
            .map(|record| session_response(record, now, 0))
            .ok_or_else(|| ApiError::NotFound("No fasting sessions recorded".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(started_hours_ago: i64, ended: Option<i64>, target_hours: i32) -> FastingSessionRecord {
        let now = Utc::now();
        FastingSessionRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            started_at: now - Duration::hours(started_hours_ago),
            ended_at: ended.map(|h| now - Duration::hours(h)),
            target_hours,
            created_at: now,
        }
    }

    #[test]
    fn test_active_session_response() {
        let now = Utc::now();
        let response = session_response(&record(8, None, 16), now, 0);
        assert!(response.is_active);
        assert!(response.met_target.is_none());
        assert!((response.elapsed_hours - 8.0).abs() < 0.01);
    }

    #[test]
    fn test_completed_session_reports_target() {
        let now = Utc::now();
        let response = session_response(&record(16, Some(1), 16), now, 225);
        assert!(!response.is_active);
        assert_eq!(response.met_target, Some(true));
        assert!((response.elapsed_hours - 15.0).abs() < 0.01);
        assert_eq!(response.xp_awarded, 225);
    }

    #[test]
    fn test_short_fast_misses_target() {
        let now = Utc::now();
        // 6 of 16 hours is well under the 90% threshold
        let response = session_response(&record(6, Some(0), 16), now, 90);
        assert_eq!(response.met_target, Some(false));
    }
}
