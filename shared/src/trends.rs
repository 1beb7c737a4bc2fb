//! Trend analysis over a metric's daily history.
//!
//! Classification compares the mean of the last three points against the
//! mean of everything before them, with a volatility check as the
//! fallback. Directional movement always wins over volatility, so a noisy
//! series that is clearly climbing still reads as improving.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Thresholds
// ============================================================================

/// Percent change beyond which a series counts as improving or declining
pub const DIRECTION_THRESHOLD_PCT: f64 = 5.0;
/// Deviation from the recent mean (as a percent of it) that marks volatility
pub const VOLATILITY_DEVIATION_PCT: f64 = 20.0;
/// Number of trailing points treated as "recent"
const RECENT_WINDOW: usize = 3;
/// Minimum points before any direction other than stable is reported
const MIN_POINTS_FOR_DIRECTION: usize = 3;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
    Volatile,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::Stable => "stable",
            TrendDirection::Volatile => "volatile",
        };
        write!(f, "{}", s)
    }
}

/// A metric's history with its computed direction, velocity, and one-step
/// prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendData {
    pub metric: String,
    pub values: Vec<f64>,
    pub dates: Vec<NaiveDate>,
    pub direction: TrendDirection,
    /// Average change per data point
    pub velocity: f64,
    /// Next expected value, absent when the history is too short
    pub prediction: Option<f64>,
}

// ============================================================================
// Analysis
// ============================================================================

/// Classifies a series. Fewer than three points is always stable.
pub fn direction(values: &[f64]) -> TrendDirection {
    if values.len() < MIN_POINTS_FOR_DIRECTION {
        return TrendDirection::Stable;
    }

    let recent = &values[values.len() - RECENT_WINDOW..];
    let earlier = &values[..values.len() - (RECENT_WINDOW - 1)];
    let recent_mean = mean(recent);
    let earlier_mean = mean(earlier);

    // A flat-zero history with new signal reads as full improvement
    let change_pct = if earlier_mean == 0.0 {
        if recent_mean == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (recent_mean - earlier_mean) / earlier_mean * 100.0
    };

    if change_pct > DIRECTION_THRESHOLD_PCT {
        return TrendDirection::Improving;
    }
    if change_pct < -DIRECTION_THRESHOLD_PCT {
        return TrendDirection::Declining;
    }

    let deviation_limit = recent_mean.abs() * (VOLATILITY_DEVIATION_PCT / 100.0);
    let volatile = values
        .iter()
        .any(|v| (v - recent_mean).abs() > deviation_limit);
    if volatile {
        TrendDirection::Volatile
    } else {
        TrendDirection::Stable
    }
}

/// Average change per point: (last - first) / (count - 1), 0 for short series
pub fn velocity(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let first = values[0];
    let last = values[values.len() - 1];
    (last - first) / (values.len() - 1) as f64
}

/// One-step linear extrapolation, only offered with three or more points
pub fn predict_next(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_POINTS_FOR_DIRECTION {
        return None;
    }
    values.last().map(|last| last + velocity(values))
}

/// Runs the full analysis for one metric. `values` and `dates` are expected
/// to be parallel and in chronological order.
pub fn analyze(metric: &str, values: Vec<f64>, dates: Vec<NaiveDate>) -> TrendData {
    let dir = direction(&values);
    let vel = velocity(&values);
    let prediction = predict_next(&values);
    TrendData {
        metric: metric.to_string(),
        values,
        dates,
        direction: dir,
        velocity: vel,
        prediction,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_series_is_stable() {
        assert_eq!(direction(&[]), TrendDirection::Stable);
        assert_eq!(direction(&[50.0]), TrendDirection::Stable);
        assert_eq!(direction(&[50.0, 90.0]), TrendDirection::Stable);
    }

    #[test]
    fn test_step_up_series_is_improving() {
        // Recent mean 82 vs earlier mean 59: +39%, and the directional
        // check wins even though the series would also read as volatile
        let values = [50.0, 52.0, 54.0, 80.0, 82.0, 84.0];
        assert_eq!(direction(&values), TrendDirection::Improving);
    }

    #[test]
    fn test_step_down_series_is_declining() {
        let values = [84.0, 82.0, 80.0, 54.0, 52.0, 50.0];
        assert_eq!(direction(&values), TrendDirection::Declining);
    }

    #[test]
    fn test_flat_series_is_stable() {
        let values = [70.0, 70.0, 70.0, 70.0, 70.0];
        assert_eq!(direction(&values), TrendDirection::Stable);
    }

    #[test]
    fn test_noisy_flat_series_is_volatile() {
        // Means match (no direction) but the swings blow past 20%
        let values = [50.0, 50.0, 50.0, 50.0, 10.0, 90.0];
        assert_eq!(direction(&values), TrendDirection::Volatile);
    }

    #[test]
    fn test_small_drift_within_band_is_stable() {
        let values = [70.0, 71.0, 69.0, 70.0, 71.0, 70.0];
        assert_eq!(direction(&values), TrendDirection::Stable);
    }

    #[test]
    fn test_all_zero_series_is_stable() {
        let values = [0.0, 0.0, 0.0, 0.0];
        assert_eq!(direction(&values), TrendDirection::Stable);
    }

    #[test]
    fn test_velocity_average_step() {
        assert_eq!(velocity(&[]), 0.0);
        assert_eq!(velocity(&[42.0]), 0.0);
        assert_eq!(velocity(&[10.0, 20.0]), 10.0);
        // (80 - 50) / 3 points of travel
        assert_eq!(velocity(&[50.0, 60.0, 70.0, 80.0]), 10.0);
    }

    #[test]
    fn test_prediction_requires_three_points() {
        assert_eq!(predict_next(&[10.0, 20.0]), None);
        assert_eq!(predict_next(&[10.0, 20.0, 30.0]), Some(40.0));
    }

    #[test]
    fn test_analyze_assembles_trend_data() {
        let dates: Vec<NaiveDate> = (1..=4)
            .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
            .collect();
        let trend = analyze("overall", vec![50.0, 60.0, 70.0, 80.0], dates);
        assert_eq!(trend.metric, "overall");
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert_eq!(trend.velocity, 10.0);
        assert_eq!(trend.prediction, Some(90.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: classification never panics and always returns one of
        /// the four directions
        #[test]
        fn prop_direction_total(values in prop::collection::vec(0.0..200.0f64, 0..40)) {
            let _ = direction(&values);
        }

        /// Property: a constant series has zero velocity and predicts itself
        #[test]
        fn prop_constant_series_predicts_itself(value in 0.0..100.0f64, len in 3usize..20) {
            let values = vec![value; len];
            prop_assert_eq!(velocity(&values), 0.0);
            prop_assert_eq!(predict_next(&values), Some(value));
        }

        /// Property: prediction is always last value plus velocity
        #[test]
        fn prop_prediction_is_linear_step(values in prop::collection::vec(0.0..100.0f64, 3..30)) {
            let expected = values[values.len() - 1] + velocity(&values);
            prop_assert_eq!(predict_next(&values), Some(expected));
        }
    }
}
