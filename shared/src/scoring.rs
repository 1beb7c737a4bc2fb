//! Daily health score calculation.
//!
//! A day's activity is condensed into four component scores (nutrition,
//! activity, hydration, fasting), each clamped to 0-100, then blended into
//! a weighted overall score.
//!
//! # Design Principles
//!
//! 1. **Never invalid**: every score is finite and inside 0-100, whatever
//!    the inputs look like.
//! 2. **No signal, no credit**: a day without food logs scores 0 for
//!    nutrition rather than a neutral midpoint, and likewise for activity.
//! 3. **Deterministic**: the same day slice always yields the same score,
//!    so scores can be recomputed instead of stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{DayActivity, ExerciseEntry, FastingSession, FoodEntry, UserTargets};

// ============================================================================
// Blend Weights
// ============================================================================

/// Weight of the nutrition component in the overall score
pub const NUTRITION_WEIGHT: f64 = 0.4;
/// Weight of the activity component in the overall score
pub const ACTIVITY_WEIGHT: f64 = 0.3;
/// Weight of the hydration component in the overall score
pub const HYDRATION_WEIGHT: f64 = 0.15;
/// Weight of the fasting component in the overall score
pub const FASTING_WEIGHT: f64 = 0.15;

// Nutrition sub-weights: protein attainment matters more than the
// individual energy macros.
const CALORIE_WEIGHT: f64 = 0.3;
const PROTEIN_WEIGHT: f64 = 0.4;
const CARBS_WEIGHT: f64 = 0.15;
const FAT_WEIGHT: f64 = 0.15;

/// Minutes of exercise that earn full duration credit
const FULL_CREDIT_EXERCISE_MINUTES: f64 = 30.0;
/// Bonus points per distinct exercise type performed in a day
const VARIETY_BONUS_PER_TYPE: f64 = 5.0;
/// Cap on the variety bonus
const MAX_VARIETY_BONUS: f64 = 20.0;

// ============================================================================
// Health Score
// ============================================================================

/// The four component scores and their weighted blend for a single day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthScore {
    pub date: NaiveDate,
    pub nutrition: f64,
    pub activity: f64,
    pub hydration: f64,
    pub fasting: f64,
    pub overall: f64,
    pub computed_at: DateTime<Utc>,
}

impl HealthScore {
    /// Builds a score from raw components, clamping each and deriving the
    /// weighted overall.
    pub fn from_components(
        date: NaiveDate,
        nutrition: f64,
        activity: f64,
        hydration: f64,
        fasting: f64,
    ) -> Self {
        let nutrition = clamp_score(nutrition);
        let activity = clamp_score(activity);
        let hydration = clamp_score(hydration);
        let fasting = clamp_score(fasting);
        let overall = clamp_score(
            nutrition * NUTRITION_WEIGHT
                + activity * ACTIVITY_WEIGHT
                + hydration * HYDRATION_WEIGHT
                + fasting * FASTING_WEIGHT,
        );
        Self {
            date,
            nutrition,
            activity,
            hydration,
            fasting,
            overall,
            computed_at: Utc::now(),
        }
    }
}

/// Clamps a raw value into the 0-100 score range; non-finite input scores 0
pub fn clamp_score(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

// ============================================================================
// Component Scores
// ============================================================================

/// Closeness to a target: 100 at the target, minus one point per percent
/// of absolute deviation. Overshoot and undershoot penalize equally.
///
/// Formula: clamp(100 - |total - target| / target * 100)
pub fn deviation_score(total: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    clamp_score(100.0 - (total - target).abs() / target * 100.0)
}

/// Progress toward a target: one point per percent attained, capped at 100.
/// Exceeding the target is not penalized.
///
/// Formula: clamp(total / target * 100)
pub fn attainment_score(total: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    clamp_score(total / target * 100.0)
}

/// Nutrition component: weighted blend of calorie closeness, protein
/// attainment, and carb/fat closeness. A day without food logs scores 0.
pub fn nutrition_score(food: &[FoodEntry], targets: &UserTargets) -> f64 {
    if food.is_empty() {
        return 0.0;
    }

    let calories: f64 = food.iter().map(|f| f.calories).sum();
    let protein: f64 = food.iter().map(|f| f.protein_g).sum();
    let carbs: f64 = food.iter().map(|f| f.carbs_g).sum();
    let fat: f64 = food.iter().map(|f| f.fat_g).sum();

    let calorie_score = deviation_score(calories, targets.effective_calorie_target());
    let protein_score = attainment_score(protein, targets.effective_protein_target_g());
    let carbs_score = deviation_score(carbs, targets.effective_carbs_target_g());
    let fat_score = deviation_score(fat, targets.effective_fat_target_g());

    clamp_score(
        calorie_score * CALORIE_WEIGHT
            + protein_score * PROTEIN_WEIGHT
            + carbs_score * CARBS_WEIGHT
            + fat_score * FAT_WEIGHT,
    )
}

/// Activity component: full credit at 30 minutes, plus 5 points per
/// distinct exercise type up to 20 bonus points, capped at 100 total.
/// A day without exercise logs scores 0.
pub fn activity_score(exercise: &[ExerciseEntry]) -> f64 {
    if exercise.is_empty() {
        return 0.0;
    }

    let minutes: i64 = exercise.iter().map(|e| e.duration_minutes as i64).sum();
    let duration_score =
        (minutes as f64 / FULL_CREDIT_EXERCISE_MINUTES * 100.0).min(100.0);

    let unique_types: BTreeSet<&str> =
        exercise.iter().map(|e| e.exercise_type.as_str()).collect();
    let variety_bonus =
        (unique_types.len() as f64 * VARIETY_BONUS_PER_TYPE).min(MAX_VARIETY_BONUS);

    clamp_score(duration_score + variety_bonus)
}

/// Hydration component: linear progress toward the daily goal, capped at 100
pub fn hydration_score(total_ml: i64, goal_ml: i32) -> f64 {
    if goal_ml <= 0 {
        return 0.0;
    }
    clamp_score(total_ml as f64 / goal_ml as f64 * 100.0)
}

/// Fasting component for a given day.
///
/// An active session scores its elapsed-to-target ratio (capped at 100).
/// Otherwise the most recently started completed session from that day
/// scores its actual-to-target ratio. No session scores 0.
pub fn fasting_score(
    sessions: &[FastingSession],
    date: NaiveDate,
    now: DateTime<Utc>,
) -> f64 {
    if let Some(active) = sessions.iter().find(|s| s.is_active()) {
        if active.target_hours <= 0 {
            return 0.0;
        }
        return clamp_score(active.elapsed_hours(now) / active.target_hours as f64 * 100.0);
    }

    let completed_today = sessions
        .iter()
        .filter(|s| !s.is_active() && s.started_at.date_naive() == date)
        .max_by_key(|s| s.started_at);

    match completed_today {
        Some(session) if session.target_hours > 0 => {
            let actual = session.actual_hours().unwrap_or(0.0);
            clamp_score(actual / session.target_hours as f64 * 100.0)
        }
        _ => 0.0,
    }
}

/// Computes the full health score for one day slice
pub fn score_for_day(day: &DayActivity, targets: &UserTargets, now: DateTime<Utc>) -> HealthScore {
    HealthScore::from_components(
        day.date,
        nutrition_score(&day.food, targets),
        activity_score(&day.exercise),
        hydration_score(day.total_water_ml(), targets.effective_water_goal_ml()),
        fasting_score(&day.fasting, day.date, now),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn food(calories: f64, protein: f64, carbs: f64, fat: f64) -> FoodEntry {
        FoodEntry {
            id: Uuid::new_v4(),
            name: "test meal".to_string(),
            calories,
            protein_g: protein,
            carbs_g: carbs,
            fat_g: fat,
            consumed_at: Utc::now(),
        }
    }

    fn workout(exercise_type: &str, minutes: i32) -> ExerciseEntry {
        ExerciseEntry {
            id: Uuid::new_v4(),
            exercise_type: exercise_type.to_string(),
            duration_minutes: minutes,
            calories_burned: None,
            performed_at: Utc::now(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    // ------------------------------------------------------------------
    // Nutrition
    // ------------------------------------------------------------------

    #[test]
    fn test_nutrition_score_no_food_is_zero() {
        assert_eq!(nutrition_score(&[], &UserTargets::default()), 0.0);
    }

    #[test]
    fn test_nutrition_score_perfect_day() {
        // Exactly on every default target
        let logs = vec![food(2000.0, 120.0, 200.0, 70.0)];
        let score = nutrition_score(&logs, &UserTargets::default());
        assert!((score - 100.0).abs() < 1e-9, "expected 100, got {}", score);
    }

    #[test]
    fn test_nutrition_overshoot_penalized_like_undershoot() {
        let over = vec![food(2200.0, 120.0, 200.0, 70.0)];
        let under = vec![food(1800.0, 120.0, 200.0, 70.0)];
        let targets = UserTargets::default();
        let over_score = nutrition_score(&over, &targets);
        let under_score = nutrition_score(&under, &targets);
        assert!((over_score - under_score).abs() < 1e-9);
        // 10% calorie deviation costs 10 points on the 0.3-weighted calorie score
        assert!((over_score - 97.0).abs() < 1e-9, "got {}", over_score);
    }

    #[test]
    fn test_nutrition_protein_not_penalized_for_overshoot() {
        let targets = UserTargets::default();
        let exact = nutrition_score(&[food(2000.0, 120.0, 200.0, 70.0)], &targets);
        let extra = nutrition_score(&[food(2000.0, 180.0, 200.0, 70.0)], &targets);
        assert!((exact - extra).abs() < 1e-9);
    }

    #[test]
    fn test_nutrition_zero_target_scores_zero_component() {
        let targets = UserTargets {
            calorie_target: Some(0.0),
            ..Default::default()
        };
        let logs = vec![food(2000.0, 120.0, 200.0, 70.0)];
        // Calorie component contributes 0; the rest are perfect
        let score = nutrition_score(&logs, &targets);
        assert!((score - 70.0).abs() < 1e-9, "got {}", score);
    }

    // ------------------------------------------------------------------
    // Activity
    // ------------------------------------------------------------------

    #[test]
    fn test_activity_score_no_exercise_is_zero() {
        assert_eq!(activity_score(&[]), 0.0);
    }

    #[test]
    fn test_activity_thirty_minutes_one_type() {
        let score = activity_score(&[workout("running", 30)]);
        // 100 duration + 5 variety, capped at 100
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_activity_short_session_partial_credit() {
        let score = activity_score(&[workout("yoga", 15)]);
        assert!((score - 55.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_activity_variety_bonus_counts_distinct_types() {
        let logs = vec![
            workout("running", 5),
            workout("running", 5),
            workout("cycling", 5),
        ];
        // 15 min = 50 duration, 2 distinct types = 10 bonus
        assert!((activity_score(&logs) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_variety_bonus_capped() {
        let logs: Vec<ExerciseEntry> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|t| workout(t, 1))
            .collect();
        // 6 min = 20 duration, bonus capped at 20 despite 6 types
        assert!((activity_score(&logs) - 40.0).abs() < 1e-9);
    }

    // ------------------------------------------------------------------
    // Hydration
    // ------------------------------------------------------------------

    #[test]
    fn test_hydration_score_linear_and_capped() {
        assert_eq!(hydration_score(0, 2000), 0.0);
        assert_eq!(hydration_score(1000, 2000), 50.0);
        assert_eq!(hydration_score(2000, 2000), 100.0);
        assert_eq!(hydration_score(5000, 2000), 100.0);
    }

    #[test]
    fn test_hydration_zero_goal_is_zero() {
        assert_eq!(hydration_score(1000, 0), 0.0);
    }

    // ------------------------------------------------------------------
    // Fasting
    // ------------------------------------------------------------------

    #[test]
    fn test_fasting_score_no_sessions_is_zero() {
        assert_eq!(fasting_score(&[], day(), Utc::now()), 0.0);
    }

    #[test]
    fn test_fasting_score_active_session_elapsed_ratio() {
        let now = Utc::now();
        let sessions = vec![FastingSession {
            id: Uuid::new_v4(),
            started_at: now - Duration::hours(8),
            ended_at: None,
            target_hours: 16,
        }];
        let score = fasting_score(&sessions, day(), now);
        assert!((score - 50.0).abs() < 1e-6, "got {}", score);
    }

    #[test]
    fn test_fasting_score_completed_session_same_day() {
        let started_at = day().and_hms_opt(6, 0, 0).unwrap().and_utc();
        let sessions = vec![FastingSession {
            id: Uuid::new_v4(),
            started_at,
            ended_at: Some(started_at + Duration::hours(16)),
            target_hours: 16,
        }];
        let score = fasting_score(&sessions, day(), Utc::now());
        assert!((score - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_fasting_score_prefers_most_recent_completed() {
        let morning = day().and_hms_opt(0, 0, 0).unwrap().and_utc();
        let evening = day().and_hms_opt(12, 0, 0).unwrap().and_utc();
        let sessions = vec![
            FastingSession {
                id: Uuid::new_v4(),
                started_at: morning,
                ended_at: Some(morning + Duration::hours(16)),
                target_hours: 16,
            },
            FastingSession {
                id: Uuid::new_v4(),
                started_at: evening,
                ended_at: Some(evening + Duration::hours(8)),
                target_hours: 16,
            },
        ];
        let score = fasting_score(&sessions, day(), Utc::now());
        assert!((score - 50.0).abs() < 1e-6, "got {}", score);
    }

    #[test]
    fn test_fasting_score_long_fast_capped() {
        let now = Utc::now();
        let sessions = vec![FastingSession {
            id: Uuid::new_v4(),
            started_at: now - Duration::hours(40),
            ended_at: None,
            target_hours: 16,
        }];
        assert_eq!(fasting_score(&sessions, day(), now), 100.0);
    }

    // ------------------------------------------------------------------
    // Overall
    // ------------------------------------------------------------------

    #[test]
    fn test_overall_weighted_blend() {
        let score = HealthScore::from_components(day(), 80.0, 60.0, 100.0, 40.0);
        let expected = 80.0 * 0.4 + 60.0 * 0.3 + 100.0 * 0.15 + 40.0 * 0.15;
        assert!((score.overall - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_day_scores_zero_overall() {
        let score = score_for_day(&DayActivity::empty(day()), &UserTargets::default(), Utc::now());
        assert_eq!(score.overall, 0.0);
        assert_eq!(score.nutrition, 0.0);
        assert_eq!(score.activity, 0.0);
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: every component and the overall stay inside 0-100 for
        /// arbitrary (even hostile) inputs
        #[test]
        fn prop_scores_always_in_range(
            nutrition in -1000.0..1000.0f64,
            activity in -1000.0..1000.0f64,
            hydration in -1000.0..1000.0f64,
            fasting in -1000.0..1000.0f64,
        ) {
            let score = HealthScore::from_components(day(), nutrition, activity, hydration, fasting);
            prop_assert!(score.overall >= 0.0 && score.overall <= 100.0);
            prop_assert!(score.nutrition >= 0.0 && score.nutrition <= 100.0);
            prop_assert!(score.activity >= 0.0 && score.activity <= 100.0);
            prop_assert!(score.hydration >= 0.0 && score.hydration <= 100.0);
            prop_assert!(score.fasting >= 0.0 && score.fasting <= 100.0);
        }

        /// Property: the overall equals the exact weighted sum whenever all
        /// components are already in range
        #[test]
        fn prop_overall_is_weighted_sum(
            nutrition in 0.0..=100.0f64,
            activity in 0.0..=100.0f64,
            hydration in 0.0..=100.0f64,
            fasting in 0.0..=100.0f64,
        ) {
            let score = HealthScore::from_components(day(), nutrition, activity, hydration, fasting);
            let expected = nutrition * NUTRITION_WEIGHT
                + activity * ACTIVITY_WEIGHT
                + hydration * HYDRATION_WEIGHT
                + fasting * FASTING_WEIGHT;
            prop_assert!(
                (score.overall - expected).abs() < 1e-9,
                "overall {} != weighted sum {}",
                score.overall,
                expected
            );
        }

        /// Property: deviation score is symmetric around the target
        #[test]
        fn prop_deviation_score_symmetric(
            target in 1.0..5000.0f64,
            offset in 0.0..5000.0f64,
        ) {
            let over = deviation_score(target + offset, target);
            let under = deviation_score(target - offset, target);
            prop_assert!((over - under).abs() < 1e-6);
        }

        /// Property: attainment never rewards past 100 and never goes negative
        #[test]
        fn prop_attainment_bounded(total in -100.0..10000.0f64, target in 0.0..5000.0f64) {
            let score = attainment_score(total, target);
            prop_assert!((0.0..=100.0).contains(&score));
        }

        /// Property: hydration score is monotone in intake
        #[test]
        fn prop_hydration_monotone(a in 0i64..10000, b in 0i64..10000, goal in 1i32..5000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(hydration_score(lo, goal) <= hydration_score(hi, goal));
        }
    }
}
