//! Input normalization and cross-field checks the derive-level validators
//! cannot express.
//!
//! Range checks on individual fields live as `validator` attributes on the
//! request types; the functions here cover timestamps, windows, and text
//! cleanup.

use chrono::{DateTime, Duration, Utc};

/// Clock skew tolerated on client-supplied timestamps
pub const FUTURE_SKEW_TOLERANCE_MINUTES: i64 = 5;
/// How far back a client may backdate an entry
pub const MAX_BACKDATE_DAYS: i64 = 90;
/// Largest history window the API will compute in one request
pub const MAX_HISTORY_DAYS: u32 = 90;
/// History window used when the client does not ask for one
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Checks a client-supplied event timestamp: a few minutes of clock skew
/// into the future is fine, further is rejected, and entries older than
/// the backdate window are rejected too.
pub fn validate_event_timestamp(
    timestamp: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), String> {
    if timestamp > now + Duration::minutes(FUTURE_SKEW_TOLERANCE_MINUTES) {
        return Err("timestamp is in the future".to_string());
    }
    if timestamp < now - Duration::days(MAX_BACKDATE_DAYS) {
        return Err(format!(
            "timestamp is more than {} days in the past",
            MAX_BACKDATE_DAYS
        ));
    }
    Ok(())
}

/// Resolves a requested history window to something the API will serve
pub fn clamp_history_days(requested: Option<u32>) -> u32 {
    match requested {
        Some(0) => 1,
        Some(days) => days.min(MAX_HISTORY_DAYS),
        None => DEFAULT_HISTORY_DAYS,
    }
}

/// Canonical form for exercise type labels, so "Running" and " running "
/// count as one type in variety scoring
pub fn normalize_exercise_type(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trims food names; rejects names that are empty after trimming
pub fn normalize_food_name(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("food name must not be blank".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timestamp_now_is_valid() {
        let now = Utc::now();
        assert!(validate_event_timestamp(now, now).is_ok());
    }

    #[test]
    fn test_timestamp_slight_skew_tolerated() {
        let now = Utc::now();
        assert!(validate_event_timestamp(now + Duration::minutes(4), now).is_ok());
        assert!(validate_event_timestamp(now + Duration::minutes(6), now).is_err());
    }

    #[test]
    fn test_timestamp_backdate_window() {
        let now = Utc::now();
        assert!(validate_event_timestamp(now - Duration::days(89), now).is_ok());
        assert!(validate_event_timestamp(now - Duration::days(91), now).is_err());
    }

    #[test]
    fn test_history_days_clamped() {
        assert_eq!(clamp_history_days(None), 30);
        assert_eq!(clamp_history_days(Some(0)), 1);
        assert_eq!(clamp_history_days(Some(7)), 7);
        assert_eq!(clamp_history_days(Some(365)), 90);
    }

    #[test]
    fn test_exercise_type_normalized() {
        assert_eq!(normalize_exercise_type("  Running "), "running");
        assert_eq!(normalize_exercise_type("HIIT"), "hiit");
    }

    #[test]
    fn test_food_name_trimmed_and_non_blank() {
        assert_eq!(normalize_food_name("  Oatmeal ").as_deref(), Ok("Oatmeal"));
        assert!(normalize_food_name("   ").is_err());
        assert!(normalize_food_name("").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: the clamped window always lands in 1..=MAX_HISTORY_DAYS
        #[test]
        fn prop_history_days_in_range(requested in proptest::option::of(0u32..10_000)) {
            let days = clamp_history_days(requested);
            prop_assert!((1..=MAX_HISTORY_DAYS).contains(&days));
        }

        /// Property: normalization is idempotent
        #[test]
        fn prop_normalize_idempotent(raw in "[a-zA-Z ]{0,40}") {
            let once = normalize_exercise_type(&raw);
            prop_assert_eq!(normalize_exercise_type(&once), once.clone());
        }
    }
}
