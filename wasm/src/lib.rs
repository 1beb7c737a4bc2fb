//! Wellspring WASM Module
//!
//! WebAssembly bindings over the shared engine rules, so dashboards can
//! preview scores and progression readouts in the browser without a
//! round trip.

use wasm_bindgen::prelude::*;
use wellspring_shared::{progression, scoring, trends};

/// Weighted overall score from the four component scores (each 0-100)
#[wasm_bindgen]
pub fn overall_score(nutrition: f64, activity: f64, hydration: f64, fasting: f64) -> f64 {
    scoring::clamp_score(
        scoring::clamp_score(nutrition) * scoring::NUTRITION_WEIGHT
            + scoring::clamp_score(activity) * scoring::ACTIVITY_WEIGHT
            + scoring::clamp_score(hydration) * scoring::HYDRATION_WEIGHT
            + scoring::clamp_score(fasting) * scoring::FASTING_WEIGHT,
    )
}

/// Hydration component score for a running total against the daily goal
#[wasm_bindgen]
pub fn hydration_score(total_ml: i32, goal_ml: i32) -> f64 {
    scoring::hydration_score(total_ml as i64, goal_ml)
}

/// Closeness-to-target score used for calories (100 at target, falling
/// off with relative deviation)
#[wasm_bindgen]
pub fn deviation_score(total: f64, target: f64) -> f64 {
    scoring::deviation_score(total, target)
}

/// Progress-toward-target score used for protein, carbs, and fat
#[wasm_bindgen]
pub fn attainment_score(total: f64, target: f64) -> f64 {
    scoring::attainment_score(total, target)
}

/// Level for a lifetime XP total
#[wasm_bindgen]
pub fn level_for_xp(total_xp: f64) -> i32 {
    progression::level_for_xp(total_xp as i64)
}

/// Lifetime XP required to reach a level
#[wasm_bindgen]
pub fn xp_required(level: i32) -> f64 {
    progression::xp_required(level) as f64
}

/// XP earned past the current level threshold
#[wasm_bindgen]
pub fn xp_progress(total_xp: f64) -> f64 {
    progression::xp_progress(total_xp as i64) as f64
}

/// Display title for a level
#[wasm_bindgen]
pub fn level_title(level: i32) -> String {
    progression::level_title(level).to_string()
}

/// XP awarded for a water log
#[wasm_bindgen]
pub fn water_xp(amount_ml: i32) -> i32 {
    progression::water_xp(amount_ml) as i32
}

/// XP awarded for an exercise log
#[wasm_bindgen]
pub fn exercise_xp(duration_minutes: i32) -> i32 {
    progression::exercise_xp(duration_minutes) as i32
}

/// XP awarded for a completed fast
#[wasm_bindgen]
pub fn fasting_xp(actual_hours: f64) -> i32 {
    progression::fasting_xp(actual_hours) as i32
}

/// Trend direction label for a metric series
#[wasm_bindgen]
pub fn trend_direction(values: &[f64]) -> String {
    trends::direction(values).to_string()
}

/// Average change per data point
#[wasm_bindgen]
pub fn trend_velocity(values: &[f64]) -> f64 {
    trends::velocity(values)
}

/// Next expected value, absent when the series is too short
#[wasm_bindgen]
pub fn predict_next(values: &[f64]) -> Option<f64> {
    trends::predict_next(values)
}

/// Trailing moving average for chart smoothing
#[wasm_bindgen]
pub fn moving_average(values: &[f64], window_size: usize) -> Vec<f64> {
    if values.is_empty() || window_size == 0 {
        return vec![];
    }

    let mut result = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = i.saturating_sub(window_size - 1);
        let window = &values[start..=i];
        result.push(window.iter().sum::<f64>() / window.len() as f64);
    }

    result
}
