//! Progression service - catalogs, streak math, and state assembly
//!
//! The badge, challenge, and reward catalogs live here as data. The engine
//! seeds them per user and drives progress through the pure helpers; read
//! endpoints assemble responses from stored rows, falling back to the
//! catalog at zero progress for users the engine has not touched yet.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Months, NaiveDate, Utc, Weekday};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::events::EngineHandle;
use crate::repositories::{
    BadgeRecord, ChallengeRecord, DailyExerciseSummary, DailyFoodSummary, DailyWaterSummary,
    ExerciseLogRepository, FastingSessionRepository, FoodLogRepository, ProgressionRepository,
    RewardRecord, StreakRecord, WaterLogRepository,
};
use wellspring_shared::progression::{build_leaderboard, STARTING_XP};
use wellspring_shared::{
    AchievementResponse, AchievementsResponse, Badge, BadgeCategory, BadgeRarity, Challenge,
    ChallengeKind, FastingSession, LeaderboardResponse, ProgressionResponse,
    PurchaseRewardRequest, PurchaseRewardResponse, Reward, RewardKind, Streak, StreakType,
    UserLevel,
};

// ============================================================================
// Catalogs
// ============================================================================

/// What a badge measures
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BadgeMetric {
    FoodLogs,
    ExerciseLogs,
    DistinctExerciseTypes,
    CompletedFasts,
    LoggingStreakDays,
    HydrationStreakDays,
    ExerciseStreakDays,
}

/// A badge definition seeded for every user
pub(crate) struct BadgeDef {
    pub name: &'static str,
    pub description: &'static str,
    pub category: BadgeCategory,
    pub rarity: BadgeRarity,
    pub metric: BadgeMetric,
    pub target: i64,
}

pub(crate) const BADGE_CATALOG: &[BadgeDef] = &[
    BadgeDef {
        name: "First Meal",
        description: "Log your first meal",
        category: BadgeCategory::Nutrition,
        rarity: BadgeRarity::Common,
        metric: BadgeMetric::FoodLogs,
        target: 1,
    },
    BadgeDef {
        name: "Calorie Counter",
        description: "Log 50 meals",
        category: BadgeCategory::Nutrition,
        rarity: BadgeRarity::Rare,
        metric: BadgeMetric::FoodLogs,
        target: 50,
    },
    BadgeDef {
        name: "First Workout",
        description: "Log your first workout",
        category: BadgeCategory::Exercise,
        rarity: BadgeRarity::Common,
        metric: BadgeMetric::ExerciseLogs,
        target: 1,
    },
    BadgeDef {
        name: "Exercise Explorer",
        description: "Try 5 different kinds of exercise",
        category: BadgeCategory::Exercise,
        rarity: BadgeRarity::Rare,
        metric: BadgeMetric::DistinctExerciseTypes,
        target: 5,
    },
    BadgeDef {
        name: "Iron Will",
        description: "Exercise 14 days in a row",
        category: BadgeCategory::Exercise,
        rarity: BadgeRarity::Epic,
        metric: BadgeMetric::ExerciseStreakDays,
        target: 14,
    },
    BadgeDef {
        name: "Hydration Hero",
        description: "Hit your water goal 7 days in a row",
        category: BadgeCategory::Hydration,
        rarity: BadgeRarity::Rare,
        metric: BadgeMetric::HydrationStreakDays,
        target: 7,
    },
    BadgeDef {
        name: "First Fast",
        description: "Complete your first fast",
        category: BadgeCategory::Fasting,
        rarity: BadgeRarity::Common,
        metric: BadgeMetric::CompletedFasts,
        target: 1,
    },
    BadgeDef {
        name: "Fasting Legend",
        description: "Complete 50 fasts",
        category: BadgeCategory::Fasting,
        rarity: BadgeRarity::Legendary,
        metric: BadgeMetric::CompletedFasts,
        target: 50,
    },
    BadgeDef {
        name: "Week Warrior",
        description: "Log something 7 days in a row",
        category: BadgeCategory::Consistency,
        rarity: BadgeRarity::Rare,
        metric: BadgeMetric::LoggingStreakDays,
        target: 7,
    },
    BadgeDef {
        name: "Monthly Momentum",
        description: "Log something 30 days in a row",
        category: BadgeCategory::Consistency,
        rarity: BadgeRarity::Epic,
        metric: BadgeMetric::LoggingStreakDays,
        target: 30,
    },
];

/// How often a challenge window repeats
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Cadence {
    Weekly,
    Monthly,
}

/// A challenge definition, re-seeded for each new window
pub(crate) struct ChallengeDef {
    pub name: &'static str,
    pub kind: ChallengeKind,
    pub cadence: Cadence,
    pub target: i32,
    pub xp_reward: i64,
}

pub(crate) const CHALLENGE_CATALOG: &[ChallengeDef] = &[
    ChallengeDef {
        name: "Workout Week",
        kind: ChallengeKind::ExerciseDays,
        cadence: Cadence::Weekly,
        target: 5,
        xp_reward: 100,
    },
    ChallengeDef {
        name: "Hydration Challenge",
        kind: ChallengeKind::HydrationDays,
        cadence: Cadence::Weekly,
        target: 7,
        xp_reward: 150,
    },
    ChallengeDef {
        name: "Fasting Focus",
        kind: ChallengeKind::FastingCount,
        cadence: Cadence::Monthly,
        target: 10,
        xp_reward: 300,
    },
    ChallengeDef {
        name: "Consistency Champion",
        kind: ChallengeKind::ActiveDays,
        cadence: Cadence::Monthly,
        target: 25,
        xp_reward: 500,
    },
];

/// A completed fast must run at least this long to count toward the
/// fasting challenge
pub(crate) const FASTING_CHALLENGE_MIN_HOURS: f64 = 16.0;

/// A reward definition seeded for every user
pub(crate) struct RewardDef {
    pub name: &'static str,
    pub kind: RewardKind,
    pub cost: i64,
    pub required_level: i32,
}

pub(crate) const REWARD_CATALOG: &[RewardDef] = &[
    RewardDef {
        name: "Trailblazer Avatar",
        kind: RewardKind::Avatar,
        cost: 150,
        required_level: 3,
    },
    RewardDef {
        name: "Ocean Theme",
        kind: RewardKind::Theme,
        cost: 200,
        required_level: 5,
    },
    RewardDef {
        name: "Midnight Theme",
        kind: RewardKind::Theme,
        cost: 500,
        required_level: 10,
    },
    RewardDef {
        name: "Advanced Analytics",
        kind: RewardKind::Feature,
        cost: 750,
        required_level: 15,
    },
    RewardDef {
        name: "Custom Title",
        kind: RewardKind::Title,
        cost: 1000,
        required_level: 20,
    },
];

/// Fixed peer standings shown around the user on the weekly board
const LEADERBOARD_PEERS: &[(&str, i64)] = &[
    ("Ava", 5200),
    ("Noah", 4100),
    ("Maya", 2650),
    ("Liam", 1800),
    ("Zoe", 950),
];

const CURRENT_USER_NAME: &str = "You";

// ============================================================================
// Windows and progress math
// ============================================================================

/// The challenge window containing `today` for a cadence
pub(crate) fn challenge_window(cadence: Cadence, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match cadence {
        Cadence::Weekly => {
            let week = today.week(Weekday::Mon);
            (week.first_day(), week.last_day())
        }
        Cadence::Monthly => {
            let start = today.with_day(1).unwrap_or(today);
            let end = start
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(today);
            (start, end)
        }
    }
}

/// Lifetime counts and current streaks, everything badges measure
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BadgeCounts {
    pub food_logs: i64,
    pub exercise_logs: i64,
    pub distinct_exercise_types: i64,
    pub completed_fasts: i64,
    pub logging_streak: i32,
    pub exercise_streak: i32,
    pub hydration_streak: i32,
}

/// Percent progress toward a badge, capped at 100
pub(crate) fn badge_progress(def: &BadgeDef, counts: &BadgeCounts) -> f64 {
    let value = match def.metric {
        BadgeMetric::FoodLogs => counts.food_logs,
        BadgeMetric::ExerciseLogs => counts.exercise_logs,
        BadgeMetric::DistinctExerciseTypes => counts.distinct_exercise_types,
        BadgeMetric::CompletedFasts => counts.completed_fasts,
        BadgeMetric::LoggingStreakDays => counts.logging_streak as i64,
        BadgeMetric::ExerciseStreakDays => counts.exercise_streak as i64,
        BadgeMetric::HydrationStreakDays => counts.hydration_streak as i64,
    };
    if def.target <= 0 {
        return 100.0;
    }
    (value.max(0) as f64 / def.target as f64 * 100.0).min(100.0)
}

/// One day of aggregate activity, the unit streaks and challenges count
#[derive(Debug, Clone, Default)]
pub(crate) struct ActivityDay {
    pub date: NaiveDate,
    pub food_entries: i64,
    pub exercise_entries: i64,
    pub water_ml: i64,
    pub fast_started: bool,
}

impl ActivityDay {
    fn empty(date: NaiveDate) -> Self {
        ActivityDay {
            date,
            ..ActivityDay::default()
        }
    }

    /// Consistency categories met: a food entry, an exercise entry, water
    /// at or above the daily goal, a fast started
    fn category_count(&self, water_goal_ml: i32) -> usize {
        [
            self.food_entries > 0,
            self.exercise_entries > 0,
            self.water_ml >= water_goal_ml as i64,
            self.fast_started,
        ]
        .iter()
        .filter(|hit| **hit)
        .count()
    }

    /// A food, exercise, or water entry on the day; fast starts are not
    /// log entries
    fn has_any_entry(&self) -> bool {
        self.food_entries > 0 || self.exercise_entries > 0 || self.water_ml > 0
    }

    /// Any logged activity at all, fast starts included
    fn is_active(&self) -> bool {
        self.has_any_entry() || self.fast_started
    }
}

/// Merges per-category daily summaries into one row per day with activity
pub(crate) fn merge_activity_days(
    food: &[DailyFoodSummary],
    exercise: &[DailyExerciseSummary],
    water: &[DailyWaterSummary],
    fast_start_dates: &[NaiveDate],
) -> Vec<ActivityDay> {
    let mut by_date: BTreeMap<NaiveDate, ActivityDay> = BTreeMap::new();

    for summary in food {
        by_date
            .entry(summary.date)
            .or_insert_with(|| ActivityDay::empty(summary.date))
            .food_entries = summary.entry_count;
    }
    for summary in exercise {
        by_date
            .entry(summary.date)
            .or_insert_with(|| ActivityDay::empty(summary.date))
            .exercise_entries = summary.entry_count;
    }
    for summary in water {
        by_date
            .entry(summary.date)
            .or_insert_with(|| ActivityDay::empty(summary.date))
            .water_ml = summary.total_ml;
    }
    for date in fast_start_dates {
        by_date
            .entry(*date)
            .or_insert_with(|| ActivityDay::empty(*date))
            .fast_started = true;
    }

    by_date.into_values().collect()
}

/// Dates that qualify for a streak type; fasting streaks use session
/// gaps instead and are not answered here
pub(crate) fn qualifying_dates(
    days: &[ActivityDay],
    streak_type: StreakType,
    water_goal_ml: i32,
) -> HashSet<NaiveDate> {
    days.iter()
        .filter(|day| match streak_type {
            StreakType::DailyLogging => day.has_any_entry(),
            StreakType::Exercise => day.exercise_entries > 0,
            StreakType::Hydration => day.water_ml >= water_goal_ml as i64,
            StreakType::Consistency => day.category_count(water_goal_ml) >= 3,
            StreakType::Fasting => false,
        })
        .map(|day| day.date)
        .collect()
}

/// Progress inside a challenge window, counted up to and including `today`
pub(crate) fn challenge_progress(
    kind: ChallengeKind,
    days: &[ActivityDay],
    completed_fasts_in_window: i32,
    window: (NaiveDate, NaiveDate),
    water_goal_ml: i32,
) -> i32 {
    let in_window = |day: &&ActivityDay| day.date >= window.0 && day.date <= window.1;
    match kind {
        ChallengeKind::ExerciseDays => {
            days.iter().filter(in_window).filter(|d| d.exercise_entries > 0).count() as i32
        }
        ChallengeKind::HydrationDays => days
            .iter()
            .filter(in_window)
            .filter(|d| d.water_ml >= water_goal_ml as i64)
            .count() as i32,
        ChallengeKind::FastingCount => completed_fasts_in_window,
        ChallengeKind::ActiveDays => {
            days.iter().filter(in_window).filter(|d| d.is_active()).count() as i32
        }
    }
}

/// Completed fasts of challenge length whose start date falls inside the
/// window
pub(crate) fn qualifying_fasts_in_window(
    sessions: &[FastingSession],
    window: (NaiveDate, NaiveDate),
) -> i32 {
    sessions
        .iter()
        .filter(|session| {
            let started = session.started_at.date_naive();
            started >= window.0 && started <= window.1
        })
        .filter(|session| {
            matches!(session.actual_hours(), Some(hours) if hours >= FASTING_CHALLENGE_MIN_HOURS)
        })
        .count() as i32
}

// ============================================================================
// Record conversions
// ============================================================================

pub(crate) fn badge_from_record(record: &BadgeRecord) -> Option<Badge> {
    let category: BadgeCategory = match record.category.parse() {
        Ok(category) => category,
        Err(_) => {
            warn!("skipping badge {} with unknown category {}", record.name, record.category);
            return None;
        }
    };
    let rarity: BadgeRarity = match record.rarity.parse() {
        Ok(rarity) => rarity,
        Err(_) => {
            warn!("skipping badge {} with unknown rarity {}", record.name, record.rarity);
            return None;
        }
    };
    Some(Badge {
        name: record.name.clone(),
        description: record.description.clone(),
        category,
        rarity,
        progress: record.progress,
        unlocked_at: record.unlocked_at,
    })
}

pub(crate) fn streak_from_record(record: &StreakRecord) -> Option<Streak> {
    let streak_type: StreakType = record.streak_type.parse().ok()?;
    Some(Streak {
        streak_type,
        current: record.current_count,
        best: record.best_count,
    })
}

pub(crate) fn challenge_from_record(record: &ChallengeRecord) -> Option<Challenge> {
    let kind: ChallengeKind = record.kind.parse().ok()?;
    Some(Challenge {
        name: record.name.clone(),
        kind,
        start_date: record.start_date,
        end_date: record.end_date,
        target: record.target,
        progress: record.progress,
        xp_reward: record.xp_reward,
        completed_at: record.completed_at,
    })
}

pub(crate) fn reward_from_record(record: &RewardRecord) -> Option<Reward> {
    let kind: RewardKind = record.kind.parse().ok()?;
    Some(Reward {
        name: record.name.clone(),
        kind,
        cost: record.cost,
        required_level: record.required_level,
        unlocked_at: record.unlocked_at,
        purchased_at: record.purchased_at,
    })
}

// ============================================================================
// Zero-state fallbacks
// ============================================================================

fn catalog_badges() -> Vec<Badge> {
    BADGE_CATALOG
        .iter()
        .map(|def| Badge {
            name: def.name.to_string(),
            description: def.description.to_string(),
            category: def.category,
            rarity: def.rarity,
            progress: 0.0,
            unlocked_at: None,
        })
        .collect()
}

fn catalog_challenges(today: NaiveDate) -> Vec<Challenge> {
    CHALLENGE_CATALOG
        .iter()
        .map(|def| {
            let (start_date, end_date) = challenge_window(def.cadence, today);
            Challenge {
                name: def.name.to_string(),
                kind: def.kind,
                start_date,
                end_date,
                target: def.target,
                progress: 0,
                xp_reward: def.xp_reward,
                completed_at: None,
            }
        })
        .collect()
}

fn catalog_rewards() -> Vec<Reward> {
    REWARD_CATALOG
        .iter()
        .map(|def| Reward {
            name: def.name.to_string(),
            kind: def.kind,
            cost: def.cost,
            required_level: def.required_level,
            unlocked_at: None,
            purchased_at: None,
        })
        .collect()
}

fn zero_streaks() -> Vec<Streak> {
    [
        StreakType::DailyLogging,
        StreakType::Exercise,
        StreakType::Hydration,
        StreakType::Fasting,
        StreakType::Consistency,
    ]
    .into_iter()
    .map(Streak::new)
    .collect()
}

// ============================================================================
// Service
// ============================================================================

/// Progression service
pub struct ProgressionService;

impl ProgressionService {
    /// Aggregates repository summaries into one row per day with activity
    pub(crate) async fn collect_activity_days(
        db: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityDay>, ApiError> {
        let food = FoodLogRepository::get_daily_counts(db, user_id, start, end).await?;
        let exercise = ExerciseLogRepository::get_daily_summaries(db, user_id, start, end).await?;
        let water = WaterLogRepository::get_daily_summaries(db, user_id, start, end).await?;
        let fasts = FastingSessionRepository::get_started_in_range(db, user_id, start, end).await?;
        let fast_dates: Vec<NaiveDate> = fasts
            .iter()
            .map(|session| session.started_at.date_naive())
            .collect();

        Ok(merge_activity_days(&food, &exercise, &water, &fast_dates))
    }

    /// Full progression state for a user. Users the engine has not seen yet
    /// get the catalog at zero progress and the starting XP balance.
    pub async fn get_progression(db: &PgPool, user_id: Uuid) -> Result<ProgressionResponse, ApiError> {
        let state = ProgressionRepository::get_state(db, user_id).await?;
        let (total_xp, available_points) = state
            .map(|s| (s.total_xp, s.available_points))
            .unwrap_or((STARTING_XP, STARTING_XP));

        let badge_records = ProgressionRepository::get_badges(db, user_id).await?;
        let badges = if badge_records.is_empty() {
            catalog_badges()
        } else {
            badge_records.iter().filter_map(badge_from_record).collect()
        };

        let streak_records = ProgressionRepository::get_streaks(db, user_id).await?;
        let streaks = if streak_records.is_empty() {
            zero_streaks()
        } else {
            streak_records.iter().filter_map(streak_from_record).collect()
        };

        let today = Utc::now().date_naive();
        let challenge_records =
            ProgressionRepository::get_current_challenges(db, user_id, today).await?;
        let challenges = if challenge_records.is_empty() {
            catalog_challenges(today)
        } else {
            challenge_records
                .iter()
                .filter_map(challenge_from_record)
                .collect()
        };

        let reward_records = ProgressionRepository::get_rewards(db, user_id).await?;
        let rewards = if reward_records.is_empty() {
            catalog_rewards()
        } else {
            reward_records.iter().filter_map(reward_from_record).collect()
        };

        Ok(ProgressionResponse {
            level: UserLevel::from_xp(total_xp),
            available_points,
            badges,
            streaks,
            challenges,
            rewards,
        })
    }

    /// Recent achievement log, newest first
    pub async fn get_achievements(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<AchievementsResponse, ApiError> {
        let records = ProgressionRepository::get_achievements(db, user_id).await?;
        Ok(AchievementsResponse {
            achievements: records
                .into_iter()
                .map(|record| AchievementResponse {
                    message: record.message,
                    achieved_at: record.achieved_at,
                })
                .collect(),
        })
    }

    /// Weekly leaderboard: the user ranked among fixed peer standings
    pub async fn get_leaderboard(
        db: &PgPool,
        user_id: Uuid,
        size: usize,
    ) -> Result<LeaderboardResponse, ApiError> {
        let total_xp = ProgressionRepository::get_state(db, user_id)
            .await?
            .map(|s| s.total_xp)
            .unwrap_or(STARTING_XP);

        let peers: Vec<(String, i64)> = LEADERBOARD_PEERS
            .iter()
            .map(|(name, xp)| (name.to_string(), *xp))
            .collect();
        let mut entries = build_leaderboard(&peers, CURRENT_USER_NAME, total_xp);
        entries.truncate(size);

        Ok(LeaderboardResponse {
            week_start: Utc::now().date_naive().week(Weekday::Mon).first_day(),
            entries,
        })
    }

    /// Spend points on a reward; the engine answers so balance math stays
    /// serialized with XP awards
    pub async fn purchase_reward(
        engine: &EngineHandle,
        user_id: Uuid,
        request: PurchaseRewardRequest,
    ) -> Result<PurchaseRewardResponse, ApiError> {
        request.validate()?;
        let outcome = engine.purchase_reward(user_id, request.name).await?;
        Ok(PurchaseRewardResponse {
            reward: outcome.reward,
            available_points: outcome.available_points,
        })
    }
}
