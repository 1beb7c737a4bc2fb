//! Score service - daily health scores, history, and trend analysis
//!
//! Scores are recomputed from logged activity on every read; nothing is
//! persisted, so a backdated entry changes history the next time it is
//! asked for.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::repositories::{
    DailyExerciseSummary, ExerciseLogRecord, ExerciseLogRepository, FastingSessionRecord,
    FastingSessionRepository, FoodLogRecord, FoodLogRepository, WaterLogRecord, WaterLogRepository,
};
use crate::services::targets::TargetsService;
use wellspring_shared::trends::{self, TrendData};
use wellspring_shared::validation::clamp_history_days;
use wellspring_shared::{
    score_for_day, DayActivity, ExerciseEntry, FastingSession, FoodEntry, HealthScore,
    ScoreHistoryResponse, TrendsResponse, UserTargets, WaterEntry, WeeklyScore,
};

fn decimal_to_f64(d: &Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

// ============================================================================
// Record to domain conversions
// ============================================================================

pub(crate) fn food_entry(record: &FoodLogRecord) -> FoodEntry {
    FoodEntry {
        id: record.id,
        name: record.name.clone(),
        calories: decimal_to_f64(&record.calories),
        protein_g: decimal_to_f64(&record.protein_g),
        carbs_g: decimal_to_f64(&record.carbs_g),
        fat_g: decimal_to_f64(&record.fat_g),
        consumed_at: record.consumed_at,
    }
}

pub(crate) fn exercise_entry(record: &ExerciseLogRecord) -> ExerciseEntry {
    ExerciseEntry {
        id: record.id,
        exercise_type: record.exercise_type.clone(),
        duration_minutes: record.duration_minutes,
        calories_burned: record.calories_burned,
        performed_at: record.performed_at,
    }
}

pub(crate) fn water_entry(record: &WaterLogRecord) -> WaterEntry {
    WaterEntry {
        id: record.id,
        amount_ml: record.amount_ml,
        consumed_at: record.consumed_at,
    }
}

pub(crate) fn fasting_session(record: &FastingSessionRecord) -> FastingSession {
    FastingSession {
        id: record.id,
        started_at: record.started_at,
        ended_at: record.ended_at,
        target_hours: record.target_hours,
    }
}

/// Buckets raw log records into one [`DayActivity`] per UTC date. Only days
/// that actually have an entry appear in the result.
pub(crate) fn group_days(
    food: &[FoodLogRecord],
    exercise: &[ExerciseLogRecord],
    water: &[WaterLogRecord],
    fasting: &[FastingSessionRecord],
) -> BTreeMap<NaiveDate, DayActivity> {
    let mut days: BTreeMap<NaiveDate, DayActivity> = BTreeMap::new();

    for record in food {
        let date = record.consumed_at.date_naive();
        days.entry(date)
            .or_insert_with(|| DayActivity::empty(date))
            .food
            .push(food_entry(record));
    }
    for record in exercise {
        let date = record.performed_at.date_naive();
        days.entry(date)
            .or_insert_with(|| DayActivity::empty(date))
            .exercise
            .push(exercise_entry(record));
    }
    for record in water {
        let date = record.consumed_at.date_naive();
        days.entry(date)
            .or_insert_with(|| DayActivity::empty(date))
            .water
            .push(water_entry(record));
    }
    for record in fasting {
        let date = record.started_at.date_naive();
        days.entry(date)
            .or_insert_with(|| DayActivity::empty(date))
            .fasting
            .push(fasting_session(record));
    }

    days
}

/// Rolls daily scores up into Monday-start weeks
pub(crate) fn weekly_scores(daily: &[HealthScore]) -> Vec<WeeklyScore> {
    let mut weeks: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for score in daily {
        let week_start = score.date.week(Weekday::Mon).first_day();
        let entry = weeks.entry(week_start).or_insert((0.0, 0));
        entry.0 += score.overall;
        entry.1 += 1;
    }

    weeks
        .into_iter()
        .map(|(week_start, (sum, count))| WeeklyScore {
            week_start,
            overall: sum / count as f64,
            days_with_data: count,
        })
        .collect()
}

/// Weeks of history fed into trend analysis
const TREND_WEEKS: usize = 8;

/// Weekly score snapshots and weekly exercise-minute totals, oldest first,
/// truncated to the last eight weeks. Weeks without logged data are omitted,
/// not zero-filled; an empty history yields empty series, which classify as
/// stable with no forecast.
pub(crate) fn trend_series(
    weekly: &[WeeklyScore],
    exercise_days: &[DailyExerciseSummary],
) -> Vec<TrendData> {
    let scores = &weekly[weekly.len().saturating_sub(TREND_WEEKS)..];
    let score_values: Vec<f64> = scores.iter().map(|w| w.overall).collect();
    let score_dates: Vec<NaiveDate> = scores.iter().map(|w| w.week_start).collect();

    let mut minutes: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for day in exercise_days {
        let week_start = day.date.week(Weekday::Mon).first_day();
        *minutes.entry(week_start).or_insert(0.0) += day.total_minutes as f64;
    }
    let weeks: Vec<(NaiveDate, f64)> = minutes.into_iter().collect();
    let tail = &weeks[weeks.len().saturating_sub(TREND_WEEKS)..];
    let minute_values: Vec<f64> = tail.iter().map(|(_, total)| *total).collect();
    let minute_dates: Vec<NaiveDate> = tail.iter().map(|(week, _)| *week).collect();

    vec![
        trends::analyze("health_score", score_values, score_dates),
        trends::analyze("exercise_minutes", minute_values, minute_dates),
    ]
}

// ============================================================================
// Service
// ============================================================================

/// Score service
pub struct ScoreService;

impl ScoreService {
    /// Everything a user logged on one UTC date, as domain entries
    pub(crate) async fn assemble_day(
        db: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<DayActivity, ApiError> {
        let food = FoodLogRepository::get_by_date(db, user_id, date).await?;
        let exercise = ExerciseLogRepository::get_by_date(db, user_id, date).await?;
        let water = WaterLogRepository::get_by_date(db, user_id, date).await?;
        let fasting = FastingSessionRepository::get_for_day(db, user_id, date).await?;

        Ok(DayActivity {
            date,
            food: food.iter().map(food_entry).collect(),
            exercise: exercise.iter().map(exercise_entry).collect(),
            water: water.iter().map(water_entry).collect(),
            fasting: fasting.iter().map(fasting_session).collect(),
        })
    }

    /// Health score for one date, today when unspecified
    pub async fn get_score(
        db: &PgPool,
        user_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<HealthScore, ApiError> {
        let now = Utc::now();
        let date = date.unwrap_or_else(|| now.date_naive());
        let targets = TargetsService::get_effective(db, user_id).await?;
        let day = Self::assemble_day(db, user_id, date).await?;
        Ok(score_for_day(&day, &targets, now))
    }

    /// Scores for every day with data inside the window, oldest first
    pub(crate) async fn daily_scores(
        db: &PgPool,
        user_id: Uuid,
        days: u32,
        targets: &UserTargets,
    ) -> Result<Vec<HealthScore>, ApiError> {
        let now = Utc::now();
        let end = now.date_naive();
        let start = end - Duration::days(days as i64 - 1);

        let food = FoodLogRepository::get_by_date_range(db, user_id, start, end).await?;
        let exercise = ExerciseLogRepository::get_by_date_range(db, user_id, start, end).await?;
        let water = WaterLogRepository::get_by_date_range(db, user_id, start, end).await?;
        let fasting = FastingSessionRepository::get_started_in_range(db, user_id, start, end).await?;

        let days = group_days(&food, &exercise, &water, &fasting);
        Ok(days
            .values()
            .map(|day| score_for_day(day, targets, now))
            .collect())
    }

    /// Daily and weekly score history over a clamped window
    pub async fn get_history(
        db: &PgPool,
        user_id: Uuid,
        days: Option<u32>,
    ) -> Result<ScoreHistoryResponse, ApiError> {
        let window = clamp_history_days(days);
        let targets = TargetsService::get_effective(db, user_id).await?;
        let daily = Self::daily_scores(db, user_id, window, &targets).await?;
        let weekly = weekly_scores(&daily);
        Ok(ScoreHistoryResponse { daily, weekly })
    }

    /// Trend analysis over the trailing eight weeks: weekly health-score
    /// snapshots plus weekly exercise-minute totals
    pub async fn get_trends(db: &PgPool, user_id: Uuid) -> Result<TrendsResponse, ApiError> {
        let today = Utc::now().date_naive();
        let window_start =
            today.week(Weekday::Mon).first_day() - Duration::weeks(TREND_WEEKS as i64 - 1);
        let span_days = (today - window_start).num_days() as u32 + 1;

        let targets = TargetsService::get_effective(db, user_id).await?;
        let daily = Self::daily_scores(db, user_id, span_days, &targets).await?;
        let weekly = weekly_scores(&daily);
        let exercise_days =
            ExerciseLogRepository::get_daily_summaries(db, user_id, window_start, today).await?;

        Ok(TrendsResponse {
            trends: trend_series(&weekly, &exercise_days),
        })
    }
}
