//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the engine worker, and external systems.

pub mod activity;
pub mod engine;
pub mod export;
pub mod fasting;
pub mod insights;
pub mod progression;
pub mod score;
pub mod targets;

pub use activity::ActivityService;
pub use engine::{new_snapshot_store, AnalyticsSnapshot, SnapshotStore};
pub use export::ExportService;
pub use fasting::FastingService;
pub use insights::InsightService;
pub use progression::ProgressionService;
pub use score::ScoreService;
pub use targets::TargetsService;
