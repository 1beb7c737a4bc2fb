//! Wellspring Shared Library
//!
//! This crate contains the pure analytics and gamification core used by
//! both the backend and the WASM module: domain models, the daily health
//! score, trend analysis, insight rules, and progression state machines.

pub mod errors;
pub mod insights;
pub mod models;
pub mod progression;
pub mod scoring;
pub mod trends;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::*;
pub use scoring::*;
pub use types::*;

// Export the trend and insight surface (rule functions stay module-qualified)
pub use insights::{DailySample, InsightCategory, SmartInsight};
pub use trends::{TrendData, TrendDirection};

// Export progression state types (transition helpers stay module-qualified)
pub use progression::{
    Badge, BadgeCategory, BadgeRarity, Challenge, ChallengeKind, LeaderboardEntry, Reward,
    RewardKind, Streak, StreakType, UserLevel,
};
