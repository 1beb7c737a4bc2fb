//! Rule-based insight generation.
//!
//! Each rule inspects a window of recent activity and either produces one
//! insight or stays quiet. Rules are pure functions over pre-aggregated
//! daily samples so they can be unit tested without a database. The
//! assembled list is ranked by confidence, highest first.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::models::FastingSession;

// ============================================================================
// Rule Thresholds
// ============================================================================

/// Days of history the correlation and consistency rules look at
pub const CORRELATION_WINDOW_DAYS: usize = 30;
/// Days of history the meal-timing and missed-day rules look at
pub const SHORT_WINDOW_DAYS: i64 = 14;
/// Minimum days carrying data before a correlation is trusted
const MIN_CORRELATION_DAYS: usize = 10;
/// Minimum |r| before the water/exercise rule speaks up
const MIN_CORRELATION_STRENGTH: f64 = 0.3;
/// Minimum completed fasts before the fasting rule speaks up
const MIN_COMPLETED_FASTS: usize = 5;
/// Success-rate bounds for the fasting rule
const FASTING_STRONG_RATE: f64 = 80.0;
const FASTING_WEAK_RATE: f64 = 50.0;
/// Minimum meal entries before the timing rule speaks up
const MIN_MEAL_ENTRIES: usize = 20;
/// Mean meal hour below this counts as an early eater
const EARLY_EATER_HOUR: f64 = 10.0;
/// Mean meal hour above this counts as late-night eating
const LATE_EATER_HOUR: f64 = 20.0;
/// Share of days with exercise that earns the consistency achievement
const CONSISTENCY_RATE: f64 = 70.0;
/// Weekday workout count must exceed this multiple of the weekend count to
/// flag a skew
const WEEKDAY_SKEW_FACTOR: i64 = 2;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Correlation,
    Prediction,
    Optimization,
    Warning,
    Achievement,
}

/// One generated insight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartInsight {
    pub id: Uuid,
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    /// Signed expected effect on overall wellbeing, -100 to 100
    pub impact: f64,
    pub actionable: bool,
    pub recommendation: Option<String>,
    /// 0-100, used for ranking
    pub confidence: f64,
}

impl SmartInsight {
    fn new(
        category: InsightCategory,
        title: &str,
        description: String,
        impact: f64,
        actionable: bool,
        recommendation: Option<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            title: title.to_string(),
            description,
            impact: impact.clamp(-100.0, 100.0),
            actionable,
            recommendation,
            confidence: confidence.clamp(0.0, 100.0),
        }
    }
}

/// Pre-aggregated totals for one calendar day, the raw material for rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySample {
    pub date: NaiveDate,
    pub food_entries: u32,
    pub exercise_entries: u32,
    pub water_entries: u32,
    pub exercise_minutes: i64,
    pub water_ml: i64,
}

impl DailySample {
    pub fn has_any_entry(&self) -> bool {
        self.food_entries > 0 || self.exercise_entries > 0 || self.water_entries > 0
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Pearson correlation coefficient; 0 when either series has no variance
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    let n_f = n as f64;
    let sum_x: f64 = xs[..n].iter().sum();
    let sum_y: f64 = ys[..n].iter().sum();
    let sum_xy: f64 = xs[..n].iter().zip(&ys[..n]).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs[..n].iter().map(|x| x * x).sum();
    let sum_y2: f64 = ys[..n].iter().map(|y| y * y).sum();

    let denominator =
        ((n_f * sum_x2 - sum_x * sum_x) * (n_f * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    (n_f * sum_xy - sum_x * sum_y) / denominator
}

// ============================================================================
// Rules
// ============================================================================

/// Correlates daily water intake with exercise minutes over the 30-day
/// window. Needs more than 10 days carrying data and |r| > 0.3 to emit.
pub fn water_exercise_correlation(days: &[DailySample]) -> Option<SmartInsight> {
    let data_days = days.iter().filter(|d| d.has_any_entry()).count();
    if data_days <= MIN_CORRELATION_DAYS {
        return None;
    }

    let water: Vec<f64> = days.iter().map(|d| d.water_ml as f64).collect();
    let minutes: Vec<f64> = days.iter().map(|d| d.exercise_minutes as f64).collect();
    let r = pearson(&water, &minutes);
    if r.abs() <= MIN_CORRELATION_STRENGTH {
        return None;
    }

    let impact = r * 50.0;
    let confidence = (r.abs() * 100.0).min(90.0);
    if r > 0.0 {
        Some(SmartInsight::new(
            InsightCategory::Correlation,
            "Hydration fuels your workouts",
            format!(
                "On days you drink more water you also move more (correlation {:.2}).",
                r
            ),
            impact,
            true,
            Some("Drink a glass of water before your next workout.".to_string()),
            confidence,
        ))
    } else {
        Some(SmartInsight::new(
            InsightCategory::Warning,
            "Workouts are crowding out hydration",
            format!(
                "Your active days tend to be your least hydrated ones (correlation {:.2}).",
                r
            ),
            impact,
            true,
            Some("Keep a bottle within reach during exercise.".to_string()),
            confidence,
        ))
    }
}

/// Looks at the success rate of completed fasts. Active sessions are
/// ignored; a fast succeeds at >= 90% of its target.
pub fn fasting_success(sessions: &[FastingSession]) -> Option<SmartInsight> {
    let completed: Vec<&FastingSession> =
        sessions.iter().filter(|s| !s.is_active()).collect();
    if completed.len() <= MIN_COMPLETED_FASTS {
        return None;
    }

    let successes = completed.iter().filter(|s| s.met_target()).count();
    let rate = successes as f64 / completed.len() as f64 * 100.0;

    if rate > FASTING_STRONG_RATE {
        Some(SmartInsight::new(
            InsightCategory::Achievement,
            "Fasting is working for you",
            format!(
                "You completed {:.0}% of your last {} fasts at or near target.",
                rate,
                completed.len()
            ),
            40.0,
            false,
            None,
            95.0,
        ))
    } else if rate < FASTING_WEAK_RATE {
        Some(SmartInsight::new(
            InsightCategory::Warning,
            "Your fasting targets may be too ambitious",
            format!(
                "Only {:.0}% of your last {} fasts reached target.",
                rate,
                completed.len()
            ),
            -35.0,
            true,
            Some("Try a shorter fasting window and build back up.".to_string()),
            85.0,
        ))
    } else {
        None
    }
}

/// Classifies eating schedule from the hour-of-day of each meal entry over
/// the short window. Needs more than 20 entries.
pub fn meal_timing(meal_hours: &[u32]) -> Option<SmartInsight> {
    if meal_hours.len() <= MIN_MEAL_ENTRIES {
        return None;
    }
    let mean_hour =
        meal_hours.iter().map(|h| *h as f64).sum::<f64>() / meal_hours.len() as f64;

    if mean_hour < EARLY_EATER_HOUR {
        Some(SmartInsight::new(
            InsightCategory::Optimization,
            "Early eating pattern",
            format!(
                "Your meals average around {:.0}:00, which front-loads your energy intake.",
                mean_hour
            ),
            25.0,
            true,
            Some("Align an intermittent-fasting window with your early meals.".to_string()),
            75.0,
        ))
    } else if mean_hour > LATE_EATER_HOUR {
        Some(SmartInsight::new(
            InsightCategory::Warning,
            "Late-night eating pattern",
            format!(
                "Your meals average around {:.0}:00, late enough to disturb sleep and fasting.",
                mean_hour
            ),
            -30.0,
            true,
            Some("Shift your last meal a couple of hours earlier.".to_string()),
            75.0,
        ))
    } else {
        None
    }
}

/// Rewards exercising on more than 70% of the days in the window
pub fn exercise_consistency(days: &[DailySample]) -> Option<SmartInsight> {
    if days.is_empty() {
        return None;
    }
    let active_days = days.iter().filter(|d| d.exercise_entries > 0).count();
    let rate = active_days as f64 / days.len() as f64 * 100.0;
    if rate <= CONSISTENCY_RATE {
        return None;
    }
    Some(SmartInsight::new(
        InsightCategory::Achievement,
        "Remarkable exercise consistency",
        format!(
            "You exercised on {} of the last {} days ({:.0}%).",
            active_days,
            days.len(),
            rate
        ),
        45.0,
        false,
        None,
        90.0,
    ))
}

/// Flags a schedule where weekday workouts far outnumber weekend workouts
pub fn weekday_weekend_skew(days: &[DailySample]) -> Option<SmartInsight> {
    let mut weekday_entries: i64 = 0;
    let mut weekend_entries: i64 = 0;
    for day in days {
        if is_weekend(day.date.weekday()) {
            weekend_entries += day.exercise_entries as i64;
        } else {
            weekday_entries += day.exercise_entries as i64;
        }
    }
    if weekday_entries == 0 || weekday_entries <= weekend_entries * WEEKDAY_SKEW_FACTOR {
        return None;
    }
    Some(SmartInsight::new(
        InsightCategory::Correlation,
        "Weekends are your blind spot",
        format!(
            "You logged {} weekday workouts against {} on weekends.",
            weekday_entries, weekend_entries
        ),
        -15.0,
        true,
        Some("Schedule one short weekend session to keep momentum.".to_string()),
        70.0,
    ))
}

/// Predicts a likely missed workout: today's weekday has had zero exercise
/// entries across the lookback window. Weekends are exempt.
pub fn missed_day_risk(days: &[DailySample], today: NaiveDate) -> Option<SmartInsight> {
    if is_weekend(today.weekday()) {
        return None;
    }
    let cutoff = today - Duration::days(SHORT_WINDOW_DAYS);
    let matching: Vec<&DailySample> = days
        .iter()
        .filter(|d| d.date >= cutoff && d.date < today && d.date.weekday() == today.weekday())
        .collect();
    if matching.is_empty() || matching.iter().any(|d| d.exercise_entries > 0) {
        return None;
    }
    let weekday_name = weekday_label(today.weekday());
    Some(SmartInsight::new(
        InsightCategory::Prediction,
        "A quiet day is coming",
        format!(
            "{}s have gone without a workout for the last two weeks.",
            weekday_name
        ),
        -20.0,
        true,
        Some(format!("Plan a short workout this {}.", weekday_name)),
        65.0,
    ))
}

// ============================================================================
// Assembly
// ============================================================================

/// Runs every rule and returns the insights ranked by confidence, highest
/// first
pub fn generate_insights(
    days: &[DailySample],
    meal_hours: &[u32],
    fasting_sessions: &[FastingSession],
    today: NaiveDate,
) -> Vec<SmartInsight> {
    let mut insights: Vec<SmartInsight> = [
        water_exercise_correlation(days),
        fasting_success(fasting_sessions),
        meal_timing(meal_hours),
        exercise_consistency(days),
        weekday_weekend_skew(days),
        missed_day_risk(days, today),
    ]
    .into_iter()
    .flatten()
    .collect();

    rank(&mut insights);
    insights
}

/// Orders insights by confidence, highest first
pub fn rank(insights: &mut [SmartInsight]) {
    insights.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn sample(day: u32, water_ml: i64, exercise_minutes: i64) -> DailySample {
        DailySample {
            date: date(day),
            food_entries: 0,
            exercise_entries: if exercise_minutes > 0 { 1 } else { 0 },
            water_entries: if water_ml > 0 { 1 } else { 0 },
            exercise_minutes,
            water_ml,
        }
    }

    fn completed_fast(start: DateTime<Utc>, actual_hours: i64, target: i32) -> FastingSession {
        FastingSession {
            id: Uuid::new_v4(),
            started_at: start,
            ended_at: Some(start + Duration::hours(actual_hours)),
            target_hours: target,
        }
    }

    fn workout_day(day: u32, entries: u32, minutes: i64) -> DailySample {
        DailySample {
            date: date(day),
            exercise_entries: entries,
            exercise_minutes: minutes,
            ..DailySample::default()
        }
    }

    // ------------------------------------------------------------------
    // Pearson
    // ------------------------------------------------------------------

    #[test]
    fn test_pearson_perfect_positive() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [10.0, 20.0, 30.0, 40.0];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [40.0, 30.0, 20.0, 10.0];
        assert!((pearson(&xs, &ys) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_no_variance_is_zero() {
        let xs = [5.0, 5.0, 5.0];
        let ys = [1.0, 2.0, 3.0];
        assert_eq!(pearson(&xs, &ys), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    // ------------------------------------------------------------------
    // Water / exercise correlation
    // ------------------------------------------------------------------

    fn correlated_month() -> Vec<DailySample> {
        // Water tracks exercise perfectly across 30 days
        (1..=30)
            .map(|d| sample(d, (d as i64 % 7 + 1) * 400, (d as i64 % 7 + 1) * 10))
            .collect()
    }

    #[test]
    fn test_correlation_rule_emits_on_strong_pairing() {
        let insight = water_exercise_correlation(&correlated_month())
            .expect("strong correlation should emit");
        assert_eq!(insight.category, InsightCategory::Correlation);
        assert!(insight.impact > 0.0);
        assert!(insight.confidence >= 90.0);
        assert!(insight.actionable);
    }

    #[test]
    fn test_correlation_rule_needs_enough_days() {
        let days: Vec<DailySample> = (1..=10).map(|d| sample(d, d as i64 * 100, d as i64 * 5)).collect();
        assert!(water_exercise_correlation(&days).is_none());
    }

    #[test]
    fn test_correlation_rule_quiet_on_weak_signal() {
        // Constant water, varying exercise: r = 0
        let days: Vec<DailySample> = (1..=30).map(|d| sample(d, 2000, d as i64 % 5 * 10 + 5)).collect();
        assert!(water_exercise_correlation(&days).is_none());
    }

    #[test]
    fn test_negative_correlation_is_a_warning() {
        let days: Vec<DailySample> = (1..=30)
            .map(|d| {
                let level = d as i64 % 7 + 1;
                sample(d, (8 - level) * 400, level * 10)
            })
            .collect();
        let insight = water_exercise_correlation(&days).expect("should emit");
        assert_eq!(insight.category, InsightCategory::Warning);
        assert!(insight.impact < 0.0);
    }

    // ------------------------------------------------------------------
    // Fasting success
    // ------------------------------------------------------------------

    #[test]
    fn test_fasting_rule_needs_more_than_five_fasts() {
        let start = Utc::now() - Duration::days(10);
        let sessions: Vec<FastingSession> =
            (0..5).map(|i| completed_fast(start + Duration::days(i), 16, 16)).collect();
        assert!(fasting_success(&sessions).is_none());
    }

    #[test]
    fn test_fasting_rule_strong_rate_is_achievement() {
        let start = Utc::now() - Duration::days(10);
        let sessions: Vec<FastingSession> =
            (0..6).map(|i| completed_fast(start + Duration::days(i), 16, 16)).collect();
        let insight = fasting_success(&sessions).expect("should emit");
        assert_eq!(insight.category, InsightCategory::Achievement);
        assert_eq!(insight.confidence, 95.0);
        assert!(!insight.actionable);
    }

    #[test]
    fn test_fasting_rule_weak_rate_is_warning() {
        let start = Utc::now() - Duration::days(10);
        let mut sessions: Vec<FastingSession> =
            (0..2).map(|i| completed_fast(start + Duration::days(i), 16, 16)).collect();
        // Four failures out of six: 33% success
        sessions.extend((2..6).map(|i| completed_fast(start + Duration::days(i), 8, 16)));
        let insight = fasting_success(&sessions).expect("should emit");
        assert_eq!(insight.category, InsightCategory::Warning);
        assert_eq!(insight.confidence, 85.0);
        assert!(insight.actionable);
    }

    #[test]
    fn test_fasting_rule_middling_rate_stays_quiet() {
        let start = Utc::now() - Duration::days(10);
        let mut sessions: Vec<FastingSession> =
            (0..4).map(|i| completed_fast(start + Duration::days(i), 16, 16)).collect();
        sessions.extend((4..6).map(|i| completed_fast(start + Duration::days(i), 8, 16)));
        // 67% sits between the two thresholds
        assert!(fasting_success(&sessions).is_none());
    }

    #[test]
    fn test_fasting_rule_ignores_active_sessions() {
        let start = Utc::now() - Duration::days(10);
        let mut sessions: Vec<FastingSession> =
            (0..5).map(|i| completed_fast(start + Duration::days(i), 16, 16)).collect();
        sessions.push(FastingSession {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            ended_at: None,
            target_hours: 16,
        });
        // Still only five completed
        assert!(fasting_success(&sessions).is_none());
    }

    // ------------------------------------------------------------------
    // Meal timing
    // ------------------------------------------------------------------

    #[test]
    fn test_meal_timing_needs_enough_entries() {
        let hours = vec![8u32; 20];
        assert!(meal_timing(&hours).is_none());
    }

    #[test]
    fn test_meal_timing_early_eater() {
        let hours = vec![8u32; 21];
        let insight = meal_timing(&hours).expect("should emit");
        assert_eq!(insight.category, InsightCategory::Optimization);
        assert!(insight.impact > 0.0);
    }

    #[test]
    fn test_meal_timing_late_eater() {
        let hours = vec![22u32; 21];
        let insight = meal_timing(&hours).expect("should emit");
        assert_eq!(insight.category, InsightCategory::Warning);
        assert!(insight.actionable);
    }

    #[test]
    fn test_meal_timing_midday_is_quiet() {
        let hours = vec![13u32; 30];
        assert!(meal_timing(&hours).is_none());
    }

    // ------------------------------------------------------------------
    // Consistency and skew
    // ------------------------------------------------------------------

    #[test]
    fn test_consistency_above_seventy_percent() {
        let days: Vec<DailySample> = (1..=30)
            .map(|d| sample(d, 0, if d <= 22 { 30 } else { 0 }))
            .collect();
        let insight = exercise_consistency(&days).expect("22/30 should emit");
        assert_eq!(insight.category, InsightCategory::Achievement);
        assert_eq!(insight.confidence, 90.0);
    }

    #[test]
    fn test_consistency_at_seventy_percent_is_quiet() {
        let days: Vec<DailySample> = (1..=30)
            .map(|d| sample(d, 0, if d <= 21 { 30 } else { 0 }))
            .collect();
        assert!(exercise_consistency(&days).is_none());
    }

    #[test]
    fn test_weekday_skew_counts_workouts_not_minutes() {
        // March 4-8 2024 run Monday through Friday; the 9th is a Saturday.
        // Five short weekday sessions against one long double session on
        // Saturday: the weekend wins on minutes but the counts skew 5 to 2.
        let mut days: Vec<DailySample> = (4..=8).map(|d| workout_day(d, 1, 10)).collect();
        days.push(workout_day(9, 2, 60));

        let insight = weekday_weekend_skew(&days).expect("should emit");
        assert_eq!(insight.category, InsightCategory::Correlation);
        assert!(insight.actionable);
    }

    #[test]
    fn test_balanced_week_is_quiet() {
        // Two weekend workouts a day keep pace with the single weekday ones
        let days: Vec<DailySample> = (1..=14)
            .map(|d| {
                let entries = if is_weekend(date(d).weekday()) { 2 } else { 1 };
                workout_day(d, entries, 30)
            })
            .collect();
        assert!(weekday_weekend_skew(&days).is_none());
    }

    #[test]
    fn test_skew_needs_weekday_workouts() {
        // 2024-03-02 is a Saturday
        let days = vec![workout_day(2, 2, 60)];
        assert!(weekday_weekend_skew(&days).is_none());
    }

    // ------------------------------------------------------------------
    // Missed day
    // ------------------------------------------------------------------

    #[test]
    fn test_missed_day_fires_on_empty_weekday_history() {
        // 2024-03-18 is a Monday; leave every prior Monday empty
        let today = date(18);
        let days: Vec<DailySample> = (4..18)
            .map(|d| {
                let is_monday = date(d).weekday() == Weekday::Mon;
                sample(d, if is_monday { 0 } else { 500 }, 0)
            })
            .collect();
        let insight = missed_day_risk(&days, today).expect("should emit");
        assert_eq!(insight.category, InsightCategory::Prediction);
        assert!(insight.description.contains("Monday"));
    }

    #[test]
    fn test_missed_day_quiet_when_weekday_has_entries() {
        let today = date(18);
        let days: Vec<DailySample> = (4..18).map(|d| sample(d, 500, 0)).collect();
        assert!(missed_day_risk(&days, today).is_none());
    }

    #[test]
    fn test_missed_day_exempts_weekends() {
        // 2024-03-16 is a Saturday
        let today = date(16);
        let days: Vec<DailySample> = (2..16).map(|d| sample(d, 0, 0)).collect();
        assert!(missed_day_risk(&days, today).is_none());
    }

    // ------------------------------------------------------------------
    // Assembly
    // ------------------------------------------------------------------

    #[test]
    fn test_generate_ranks_by_confidence_descending() {
        let days = correlated_month();
        let start = Utc::now() - Duration::days(10);
        let fasts: Vec<FastingSession> =
            (0..6).map(|i| completed_fast(start + Duration::days(i), 16, 16)).collect();
        let insights = generate_insights(&days, &[], &fasts, date(31));
        assert!(insights.len() >= 2);
        for pair in insights.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        // The 95-confidence fasting achievement outranks the capped-at-90
        // correlation insight
        assert_eq!(insights[0].category, InsightCategory::Achievement);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: pearson always lands in [-1, 1] (within float slack)
        #[test]
        fn prop_pearson_bounded(
            xs in prop::collection::vec(0.0..1000.0f64, 2..40),
            ys in prop::collection::vec(0.0..1000.0f64, 2..40),
        ) {
            let r = pearson(&xs, &ys);
            prop_assert!(r >= -1.0 - 1e-9 && r <= 1.0 + 1e-9, "r = {}", r);
        }

        /// Property: every generated insight carries a confidence in range
        /// and the list is sorted by it
        #[test]
        fn prop_insights_ranked_and_bounded(
            water in prop::collection::vec(0i64..4000, 30),
            minutes in prop::collection::vec(0i64..120, 30),
        ) {
            let days: Vec<DailySample> = water
                .iter()
                .zip(&minutes)
                .enumerate()
                .map(|(i, (w, m))| sample(i as u32 % 28 + 1, *w, *m))
                .collect();
            let insights = generate_insights(&days, &[], &[], date(28));
            for insight in &insights {
                prop_assert!((0.0..=100.0).contains(&insight.confidence));
                prop_assert!((-100.0..=100.0).contains(&insight.impact));
            }
            for pair in insights.windows(2) {
                prop_assert!(pair[0].confidence >= pair[1].confidence);
            }
        }
    }
}
