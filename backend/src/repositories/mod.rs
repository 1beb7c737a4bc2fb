//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod exercise;
pub mod fasting;
pub mod food;
pub mod progression;
pub mod targets;
pub mod water;

pub use exercise::{
    CreateExerciseLog, DailyExerciseSummary, ExerciseLogRecord, ExerciseLogRepository,
};
pub use fasting::{CreateFastingSession, FastingSessionRecord, FastingSessionRepository};
pub use food::{CreateFoodLog, DailyFoodSummary, FoodLogRecord, FoodLogRepository};
pub use progression::{
    AchievementRecord, BadgeRecord, ChallengeRecord, ProgressionRepository,
    ProgressionStateRecord, RewardRecord, StreakRecord,
};
pub use targets::{UpsertUserTargets, UserTargetsRecord, UserTargetsRepository};
pub use water::{CreateWaterLog, DailyWaterSummary, WaterLogRecord, WaterLogRepository};
