//! Domain models for activity data consumed by the scoring, insight, and
//! progression engines.
//!
//! These are plain serde types: the backend maps its database records into
//! them before handing slices to the pure calculators, and the WASM module
//! reuses them in the browser.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Target Defaults
// ============================================================================

/// Fallback daily calorie target when the user has not configured one
pub const DEFAULT_CALORIE_TARGET: f64 = 2000.0;
/// Fallback daily protein target in grams
pub const DEFAULT_PROTEIN_TARGET_G: f64 = 120.0;
/// Fallback daily carbohydrate target in grams
pub const DEFAULT_CARBS_TARGET_G: f64 = 200.0;
/// Fallback daily fat target in grams
pub const DEFAULT_FAT_TARGET_G: f64 = 70.0;
/// Fallback daily water goal in milliliters
pub const DEFAULT_WATER_GOAL_ML: i32 = 2000;

// ============================================================================
// Activity Entries
// ============================================================================

/// A logged meal or snack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub consumed_at: DateTime<Utc>,
}

/// A logged exercise session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: Uuid,
    pub exercise_type: String,
    pub duration_minutes: i32,
    pub calories_burned: Option<i32>,
    pub performed_at: DateTime<Utc>,
}

/// A logged water intake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterEntry {
    pub id: Uuid,
    pub amount_ml: i32,
    pub consumed_at: DateTime<Utc>,
}

/// A fasting session; `ended_at == None` means the fast is still running
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastingSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub target_hours: i32,
}

impl FastingSession {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Hours elapsed so far for an active session
    pub fn elapsed_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.started_at).num_seconds().max(0) as f64 / 3600.0
    }

    /// Actual fasted hours for a completed session, None while active
    pub fn actual_hours(&self) -> Option<f64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_seconds().max(0) as f64 / 3600.0)
    }

    /// A completed fast counts as successful at >= 90% of its target
    pub fn met_target(&self) -> bool {
        if self.target_hours <= 0 {
            return false;
        }
        match self.actual_hours() {
            Some(actual) => actual / self.target_hours as f64 >= 0.9,
            None => false,
        }
    }
}

// ============================================================================
// User Targets
// ============================================================================

/// Per-user daily targets; None falls back to the fixed defaults above
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTargets {
    pub calorie_target: Option<f64>,
    pub protein_target_g: Option<f64>,
    pub carbs_target_g: Option<f64>,
    pub fat_target_g: Option<f64>,
    pub daily_water_goal_ml: Option<i32>,
    pub gamification_enabled: bool,
}

impl Default for UserTargets {
    fn default() -> Self {
        Self {
            calorie_target: None,
            protein_target_g: None,
            carbs_target_g: None,
            fat_target_g: None,
            daily_water_goal_ml: None,
            gamification_enabled: true,
        }
    }
}

impl UserTargets {
    /// Calorie target with fallback. An explicit 0 is kept as 0 so the
    /// scoring layer can treat it as "no signal".
    pub fn effective_calorie_target(&self) -> f64 {
        self.calorie_target.unwrap_or(DEFAULT_CALORIE_TARGET)
    }

    pub fn effective_protein_target_g(&self) -> f64 {
        self.protein_target_g.unwrap_or(DEFAULT_PROTEIN_TARGET_G)
    }

    pub fn effective_carbs_target_g(&self) -> f64 {
        self.carbs_target_g.unwrap_or(DEFAULT_CARBS_TARGET_G)
    }

    pub fn effective_fat_target_g(&self) -> f64 {
        self.fat_target_g.unwrap_or(DEFAULT_FAT_TARGET_G)
    }

    pub fn effective_water_goal_ml(&self) -> i32 {
        self.daily_water_goal_ml.unwrap_or(DEFAULT_WATER_GOAL_ML)
    }
}

// ============================================================================
// Day Slice
// ============================================================================

/// One day's slice of the activity log, as consumed by the score calculator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub food: Vec<FoodEntry>,
    pub exercise: Vec<ExerciseEntry>,
    pub water: Vec<WaterEntry>,
    /// Fasting sessions that started on this day, plus the active one if any
    pub fasting: Vec<FastingSession>,
}

impl DayActivity {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    pub fn total_calories(&self) -> f64 {
        self.food.iter().map(|f| f.calories).sum()
    }

    pub fn total_protein_g(&self) -> f64 {
        self.food.iter().map(|f| f.protein_g).sum()
    }

    pub fn total_carbs_g(&self) -> f64 {
        self.food.iter().map(|f| f.carbs_g).sum()
    }

    pub fn total_fat_g(&self) -> f64 {
        self.food.iter().map(|f| f.fat_g).sum()
    }

    pub fn total_exercise_minutes(&self) -> i64 {
        self.exercise.iter().map(|e| e.duration_minutes as i64).sum()
    }

    pub fn total_water_ml(&self) -> i64 {
        self.water.iter().map(|w| w.amount_ml as i64).sum()
    }

    /// True if anything at all was logged on this day
    pub fn has_any_entry(&self) -> bool {
        !self.food.is_empty()
            || !self.exercise.is_empty()
            || !self.water.is_empty()
            || !self.fasting.is_empty()
    }
}
