//! Domain error types shared between the backend and the WASM module

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a progression transition can be refused
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressionError {
    #[error("reward '{name}' is locked until level {required_level}")]
    RewardLocked { name: String, required_level: i32 },

    #[error("reward '{name}' has already been purchased")]
    AlreadyPurchased { name: String },

    #[error("insufficient points: need {cost}, have {available}")]
    InsufficientPoints { cost: i64, available: i64 },

    #[error("no reward named '{name}'")]
    UnknownReward { name: String },

    #[error("gamification is disabled for this user")]
    GamificationDisabled,
}

/// Reasons a fasting transition can be refused
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FastingError {
    #[error("a fasting session is already active")]
    SessionAlreadyActive,

    #[error("no active fasting session to end")]
    NoActiveSession,
}
