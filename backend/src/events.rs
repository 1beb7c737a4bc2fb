//! Engine event bus.
//!
//! All writes to progression state flow through a single worker task; the
//! rest of the application only holds an [`EngineHandle`]. Producers send
//! typed XP awards and change notifications, and the worker answers
//! purchase commands over a oneshot reply. A watch channel carries a
//! monotonically increasing revision so read paths can tell when published
//! state has moved.

use std::fmt;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use wellspring_shared::Reward;

/// Buffered events before producers start waiting
const EVENT_BUFFER: usize = 256;

/// Why XP is being granted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XpReason {
    FoodLogged,
    ExerciseLogged { minutes: i32 },
    WaterLogged { amount_ml: i32 },
    FastCompleted { hours: f64 },
    BadgeUnlocked,
    ChallengeCompleted,
    LevelUpBonus { level: i32 },
}

impl fmt::Display for XpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XpReason::FoodLogged => write!(f, "food logged"),
            XpReason::ExerciseLogged { minutes } => write!(f, "{} min exercise", minutes),
            XpReason::WaterLogged { amount_ml } => write!(f, "{}ml water", amount_ml),
            XpReason::FastCompleted { hours } => write!(f, "{:.1}h fast completed", hours),
            XpReason::BadgeUnlocked => write!(f, "badge unlocked"),
            XpReason::ChallengeCompleted => write!(f, "challenge completed"),
            XpReason::LevelUpBonus { level } => write!(f, "reached level {}", level),
        }
    }
}

/// A typed XP grant
#[derive(Debug, Clone)]
pub struct XpAward {
    pub user_id: Uuid,
    pub amount: i64,
    pub reason: XpReason,
}

/// Result of a successful purchase command
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub reward: Reward,
    pub available_points: i64,
}

/// Events consumed by the engine worker
#[derive(Debug)]
pub enum EngineEvent {
    /// Apply an XP grant immediately, in arrival order
    XpAwarded(XpAward),
    /// Activity data changed; progression and analytics need a recompute
    /// (debounced inside the worker)
    DataChanged { user_id: Uuid },
    /// Spend points on a reward; answered on the reply channel
    PurchaseReward {
        user_id: Uuid,
        reward_name: String,
        reply: oneshot::Sender<ApiResult<PurchaseOutcome>>,
    },
}

/// Cloneable sender half of the bus, held in application state
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineEvent>,
    revision: watch::Receiver<u64>,
}

impl EngineHandle {
    /// Sends a typed XP award. A full or closed bus drops the award with a
    /// warning rather than failing the request that produced it.
    pub async fn award_xp(&self, award: XpAward) {
        if let Err(err) = self.tx.send(EngineEvent::XpAwarded(award)).await {
            warn!("engine bus rejected XP award: {}", err);
        }
    }

    /// Signals that a user's activity data changed
    pub async fn notify_data_changed(&self, user_id: Uuid) {
        if let Err(err) = self.tx.send(EngineEvent::DataChanged { user_id }).await {
            warn!("engine bus rejected change notification: {}", err);
        }
    }

    /// Runs a purchase through the engine and waits for its verdict
    pub async fn purchase_reward(
        &self,
        user_id: Uuid,
        reward_name: String,
    ) -> ApiResult<PurchaseOutcome> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(EngineEvent::PurchaseReward {
                user_id,
                reward_name,
                reply,
            })
            .await
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("engine worker is not running")))?;
        response
            .await
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("engine worker dropped the reply")))?
    }

    /// Current published-state revision
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// A receiver that resolves whenever published state changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.clone()
    }
}

/// Receiver half of the bus, consumed by the engine worker
pub struct EngineRx {
    pub events: mpsc::Receiver<EngineEvent>,
    pub revision: watch::Sender<u64>,
}

/// Creates the bus pair
pub fn bus() -> (EngineHandle, EngineRx) {
    let (tx, events) = mpsc::channel(EVENT_BUFFER);
    let (revision_tx, revision_rx) = watch::channel(0);
    (
        EngineHandle {
            tx,
            revision: revision_rx,
        },
        EngineRx {
            events,
            revision: revision_tx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (handle, mut rx) = bus();
        let user_id = Uuid::new_v4();

        handle
            .award_xp(XpAward {
                user_id,
                amount: 10,
                reason: XpReason::FoodLogged,
            })
            .await;
        handle.notify_data_changed(user_id).await;

        match rx.events.recv().await {
            Some(EngineEvent::XpAwarded(award)) => {
                assert_eq!(award.amount, 10);
                assert_eq!(award.reason, XpReason::FoodLogged);
            }
            other => panic!("expected XP award first, got {:?}", other),
        }
        assert!(matches!(
            rx.events.recv().await,
            Some(EngineEvent::DataChanged { .. })
        ));
    }

    #[tokio::test]
    async fn test_purchase_fails_cleanly_without_worker() {
        let (handle, rx) = bus();
        drop(rx);
        let result = handle
            .purchase_reward(Uuid::new_v4(), "Midnight Theme".to_string())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_revision_watch_reflects_worker_bumps() {
        let (handle, rx) = bus();
        assert_eq!(handle.revision(), 0);
        rx.revision.send_replace(1);
        assert_eq!(handle.revision(), 1);
    }

    #[test]
    fn test_xp_reasons_render_for_achievement_log() {
        assert_eq!(XpReason::FoodLogged.to_string(), "food logged");
        assert_eq!(
            XpReason::ExerciseLogged { minutes: 45 }.to_string(),
            "45 min exercise"
        );
        assert_eq!(
            XpReason::LevelUpBonus { level: 3 }.to_string(),
            "reached level 3"
        );
    }
}
