//! Gamification domain: XP and levels, badges, streaks, challenges, and
//! the reward shop.
//!
//! Everything here is a pure state machine. The backend loads progression
//! state, applies the transition functions, and persists whatever changed;
//! nothing in this module touches the outside world.
//!
//! # Design Principles
//!
//! 1. **One-way transitions**: unlocks, completions, and purchases set a
//!    timestamp exactly once and never fire again.
//! 2. **High-water marks**: a best streak only ever rises.
//! 3. **Derived levels**: level, required XP, and progress are functions
//!    of total XP, never stored independently.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::ProgressionError;

// ============================================================================
// XP Policy
// ============================================================================

/// XP granted for logging a meal
pub const XP_PER_FOOD_LOG: i64 = 10;
/// XP granted per minute of logged exercise
pub const XP_PER_EXERCISE_MINUTE: i64 = 2;
/// XP granted per full hour of a completed fast
pub const XP_PER_FASTING_HOUR: i64 = 15;
/// XP granted per 250ml of logged water
pub const XP_PER_WATER_UNIT: i64 = 5;
/// Water volume that earns one XP unit
pub const WATER_XP_UNIT_ML: i32 = 250;

/// XP a brand-new (or recovered) profile starts with
pub const STARTING_XP: i64 = 50;
/// Bonus XP granted on level-up, multiplied by the level just reached
pub const LEVEL_UP_BONUS_PER_LEVEL: i64 = 10;

/// Maximum days a fasting streak may skip between session starts
pub const FASTING_GAP_TOLERANCE_DAYS: i64 = 2;
/// Upper bound on how far back a daily streak walk will look
pub const MAX_STREAK_LOOKBACK_DAYS: usize = 365;
/// How many entries the achievement log retains
pub const ACHIEVEMENT_LOG_CAP: usize = 10;

/// XP for one logged water entry
pub fn water_xp(amount_ml: i32) -> i64 {
    if amount_ml <= 0 {
        return 0;
    }
    (amount_ml / WATER_XP_UNIT_ML) as i64 * XP_PER_WATER_UNIT
}

/// XP for one logged exercise session
pub fn exercise_xp(duration_minutes: i32) -> i64 {
    duration_minutes.max(0) as i64 * XP_PER_EXERCISE_MINUTE
}

/// XP for one completed fast, by full hours fasted
pub fn fasting_xp(actual_hours: f64) -> i64 {
    if actual_hours <= 0.0 {
        return 0;
    }
    actual_hours.floor() as i64 * XP_PER_FASTING_HOUR
}

// ============================================================================
// Levels
// ============================================================================

/// Level reached at a given XP total.
///
/// Formula: level = max(1, floor(sqrt(totalXP / 100)))
pub fn level_for_xp(total_xp: i64) -> i32 {
    if total_xp < 100 {
        return 1;
    }
    let level = (total_xp as f64 / 100.0).sqrt().floor() as i32;
    level.max(1)
}

/// Cumulative XP at which a level begins.
///
/// Formula: xpRequired = level^2 * 100
pub fn xp_required(level: i32) -> i64 {
    let level = level.max(0) as i64;
    level * level * 100
}

/// XP earned past the current level's threshold
pub fn xp_progress(total_xp: i64) -> i64 {
    (total_xp - xp_required(level_for_xp(total_xp))).max(0)
}

/// Bonus XP minted when `new_level` is first reached
pub fn level_up_bonus(new_level: i32) -> i64 {
    new_level.max(0) as i64 * LEVEL_UP_BONUS_PER_LEVEL
}

/// Honorific for a level, the highest table entry at or below it
pub fn level_title(level: i32) -> &'static str {
    match level {
        i32::MIN..=4 => "Novice",
        5..=9 => "Apprentice",
        10..=14 => "Adept",
        15..=19 => "Expert",
        20..=29 => "Master",
        30..=49 => "Grandmaster",
        _ => "Legend",
    }
}

/// Perks unlocked at or below a level
pub fn level_benefits(level: i32) -> Vec<String> {
    let mut benefits = vec!["Daily health score".to_string()];
    if level >= 3 {
        benefits.push("Weekly trend reports".to_string());
    }
    if level >= 5 {
        benefits.push("Theme shop".to_string());
    }
    if level >= 10 {
        benefits.push("Exclusive midnight theme".to_string());
    }
    if level >= 20 {
        benefits.push("Custom profile titles".to_string());
    }
    benefits
}

/// Snapshot of a user's level standing, derived entirely from total XP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLevel {
    pub level: i32,
    pub title: String,
    pub total_xp: i64,
    /// XP threshold where the current level began
    pub xp_required: i64,
    /// XP threshold where the next level begins
    pub xp_for_next_level: i64,
    /// XP earned past the current threshold
    pub xp_progress: i64,
    pub benefits: Vec<String>,
}

impl UserLevel {
    pub fn from_xp(total_xp: i64) -> Self {
        let level = level_for_xp(total_xp);
        Self {
            level,
            title: level_title(level).to_string(),
            total_xp,
            xp_required: xp_required(level),
            xp_for_next_level: xp_required(level + 1),
            xp_progress: xp_progress(total_xp),
            benefits: level_benefits(level),
        }
    }
}

// ============================================================================
// Badges
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl BadgeRarity {
    /// One-time XP granted when a badge of this rarity unlocks
    pub fn xp_reward(&self) -> i64 {
        match self {
            BadgeRarity::Common => 25,
            BadgeRarity::Rare => 50,
            BadgeRarity::Epic => 100,
            BadgeRarity::Legendary => 250,
        }
    }
}

impl fmt::Display for BadgeRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BadgeRarity::Common => "common",
            BadgeRarity::Rare => "rare",
            BadgeRarity::Epic => "epic",
            BadgeRarity::Legendary => "legendary",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BadgeRarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(BadgeRarity::Common),
            "rare" => Ok(BadgeRarity::Rare),
            "epic" => Ok(BadgeRarity::Epic),
            "legendary" => Ok(BadgeRarity::Legendary),
            other => Err(format!("unknown badge rarity: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Nutrition,
    Exercise,
    Hydration,
    Fasting,
    Consistency,
}

impl fmt::Display for BadgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BadgeCategory::Nutrition => "nutrition",
            BadgeCategory::Exercise => "exercise",
            BadgeCategory::Hydration => "hydration",
            BadgeCategory::Fasting => "fasting",
            BadgeCategory::Consistency => "consistency",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BadgeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nutrition" => Ok(BadgeCategory::Nutrition),
            "exercise" => Ok(BadgeCategory::Exercise),
            "hydration" => Ok(BadgeCategory::Hydration),
            "fasting" => Ok(BadgeCategory::Fasting),
            "consistency" => Ok(BadgeCategory::Consistency),
            other => Err(format!("unknown badge category: {}", other)),
        }
    }
}

/// A badge with its progress toward unlocking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub name: String,
    pub description: String,
    pub category: BadgeCategory,
    pub rarity: BadgeRarity,
    /// 0-100
    pub progress: f64,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Side effect of a badge crossing its threshold
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeUnlock {
    pub name: String,
    pub xp_awarded: i64,
}

impl Badge {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    /// Records freshly computed progress. Returns the unlock exactly once,
    /// the first time progress reaches 100; an already-unlocked badge keeps
    /// its timestamp and never re-awards.
    pub fn apply_progress(&mut self, progress: f64, now: DateTime<Utc>) -> Option<BadgeUnlock> {
        self.progress = if progress.is_finite() {
            progress.clamp(0.0, 100.0)
        } else {
            self.progress
        };
        if self.unlocked_at.is_some() {
            return None;
        }
        if self.progress >= 100.0 {
            self.unlocked_at = Some(now);
            Some(BadgeUnlock {
                name: self.name.clone(),
                xp_awarded: self.rarity.xp_reward(),
            })
        } else {
            None
        }
    }
}

// ============================================================================
// Streaks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakType {
    DailyLogging,
    Exercise,
    Hydration,
    Fasting,
    Consistency,
}

impl fmt::Display for StreakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreakType::DailyLogging => "daily_logging",
            StreakType::Exercise => "exercise",
            StreakType::Hydration => "hydration",
            StreakType::Fasting => "fasting",
            StreakType::Consistency => "consistency",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for StreakType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily_logging" => Ok(StreakType::DailyLogging),
            "exercise" => Ok(StreakType::Exercise),
            "hydration" => Ok(StreakType::Hydration),
            "fasting" => Ok(StreakType::Fasting),
            "consistency" => Ok(StreakType::Consistency),
            other => Err(format!("unknown streak type: {}", other)),
        }
    }
}

/// A streak's current run and all-time best
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Streak {
    pub streak_type: StreakType,
    pub current: i32,
    pub best: i32,
}

impl Streak {
    pub fn new(streak_type: StreakType) -> Self {
        Self {
            streak_type,
            current: 0,
            best: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current > 0
    }

    /// Replaces the current run, lifting the best if surpassed. The best
    /// never falls.
    pub fn record(&mut self, current: i32) {
        self.current = current.max(0);
        if self.current > self.best {
            self.best = self.current;
        }
    }
}

/// Walks backward from today counting consecutive qualifying days.
///
/// Today gets grace: if today has not (yet) qualified, the walk starts at
/// yesterday instead, so an unbroken run is not zeroed mid-day.
pub fn walk_back_streak(qualifying: &HashSet<NaiveDate>, today: NaiveDate) -> i32 {
    let mut day = if qualifying.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut count = 0;
    while qualifying.contains(&day) && count < MAX_STREAK_LOOKBACK_DAYS as i32 {
        count += 1;
        day -= Duration::days(1);
    }
    count
}

/// Fasting streak over completed sessions, newest first.
///
/// Counts sessions while each consecutive pair of start dates is at most
/// the gap tolerance apart. `start_dates` must be sorted descending.
pub fn fasting_session_streak(start_dates: &[NaiveDate]) -> i32 {
    if start_dates.is_empty() {
        return 0;
    }
    let mut count = 1;
    for pair in start_dates.windows(2) {
        let gap = (pair[0] - pair[1]).num_days();
        if gap <= FASTING_GAP_TOLERANCE_DAYS {
            count += 1;
        } else {
            break;
        }
    }
    count
}

// ============================================================================
// Challenges
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Distinct days with exercise inside the window
    ExerciseDays,
    /// Distinct days meeting the water goal inside the window
    HydrationDays,
    /// Completed fasts inside the window
    FastingCount,
    /// Distinct days with any entry inside the window
    ActiveDays,
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChallengeKind::ExerciseDays => "exercise_days",
            ChallengeKind::HydrationDays => "hydration_days",
            ChallengeKind::FastingCount => "fasting_count",
            ChallengeKind::ActiveDays => "active_days",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ChallengeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exercise_days" => Ok(ChallengeKind::ExerciseDays),
            "hydration_days" => Ok(ChallengeKind::HydrationDays),
            "fasting_count" => Ok(ChallengeKind::FastingCount),
            "active_days" => Ok(ChallengeKind::ActiveDays),
            other => Err(format!("unknown challenge kind: {}", other)),
        }
    }
}

/// A time-boxed target with a one-time XP payout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub name: String,
    pub kind: ChallengeKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target: i32,
    pub progress: i32,
    pub xp_reward: i64,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Side effect of a challenge first reaching its target
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeCompletion {
    pub name: String,
    pub xp_awarded: i64,
}

impl Challenge {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Active means the window has not closed, regardless of completion
    pub fn is_active(&self, today: NaiveDate) -> bool {
        today <= self.end_date
    }

    /// Records freshly computed progress. The completion fires exactly
    /// once, when progress first reaches the target.
    pub fn apply_progress(
        &mut self,
        progress: i32,
        now: DateTime<Utc>,
    ) -> Option<ChallengeCompletion> {
        self.progress = progress.max(0);
        if self.completed_at.is_some() {
            return None;
        }
        if self.progress >= self.target {
            self.completed_at = Some(now);
            Some(ChallengeCompletion {
                name: self.name.clone(),
                xp_awarded: self.xp_reward,
            })
        } else {
            None
        }
    }
}

// ============================================================================
// Rewards
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Theme,
    Avatar,
    Title,
    Feature,
    Cosmetic,
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RewardKind::Theme => "theme",
            RewardKind::Avatar => "avatar",
            RewardKind::Title => "title",
            RewardKind::Feature => "feature",
            RewardKind::Cosmetic => "cosmetic",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RewardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "theme" => Ok(RewardKind::Theme),
            "avatar" => Ok(RewardKind::Avatar),
            "title" => Ok(RewardKind::Title),
            "feature" => Ok(RewardKind::Feature),
            "cosmetic" => Ok(RewardKind::Cosmetic),
            other => Err(format!("unknown reward kind: {}", other)),
        }
    }
}

/// A shop item gated by level and paid for with points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub name: String,
    pub kind: RewardKind,
    pub cost: i64,
    pub required_level: i32,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub purchased_at: Option<DateTime<Utc>>,
}

impl Reward {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    pub fn is_purchased(&self) -> bool {
        self.purchased_at.is_some()
    }

    /// Unlocks the reward once the user's level qualifies. Idempotent.
    pub fn try_unlock(&mut self, level: i32, now: DateTime<Utc>) -> bool {
        if self.unlocked_at.is_some() {
            return false;
        }
        if level >= self.required_level {
            self.unlocked_at = Some(now);
            return true;
        }
        false
    }

    /// Attempts a purchase against an available-points balance. On success
    /// the caller must deduct `cost` from the balance it passed in.
    pub fn purchase(&mut self, available_points: i64, now: DateTime<Utc>) -> Result<(), ProgressionError> {
        if self.unlocked_at.is_none() {
            return Err(ProgressionError::RewardLocked {
                name: self.name.clone(),
                required_level: self.required_level,
            });
        }
        if self.purchased_at.is_some() {
            return Err(ProgressionError::AlreadyPurchased {
                name: self.name.clone(),
            });
        }
        if available_points < self.cost {
            return Err(ProgressionError::InsufficientPoints {
                cost: self.cost,
                available: available_points,
            });
        }
        self.purchased_at = Some(now);
        Ok(())
    }
}

// ============================================================================
// Leaderboard
// ============================================================================

/// One row of the weekly leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub display_name: String,
    pub xp: i64,
    pub is_current_user: bool,
}

/// Builds a dense ranking from peer standings plus the current user,
/// highest XP first
pub fn build_leaderboard(
    peers: &[(String, i64)],
    user_name: &str,
    user_xp: i64,
) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(String, i64, bool)> = peers
        .iter()
        .map(|(name, xp)| (name.clone(), *xp, false))
        .collect();
    rows.push((user_name.to_string(), user_xp, true));
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    rows.into_iter()
        .enumerate()
        .map(|(i, (display_name, xp, is_current_user))| LeaderboardEntry {
            rank: i as u32 + 1,
            display_name,
            xp,
            is_current_user,
        })
        .collect()
}
