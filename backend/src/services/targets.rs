//! Targets service - per-user goals and the gamification switch

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::events::EngineHandle;
use crate::repositories::{UpsertUserTargets, UserTargetsRecord, UserTargetsRepository};
use wellspring_shared::{TargetsResponse, UpdateTargetsRequest, UserTargets};

fn decimal_to_f64(d: &Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

fn targets_from_record(record: &UserTargetsRecord) -> UserTargets {
    UserTargets {
        calorie_target: record.calorie_target.as_ref().map(decimal_to_f64),
        protein_target_g: record.protein_target_g.as_ref().map(decimal_to_f64),
        carbs_target_g: record.carbs_target_g.as_ref().map(decimal_to_f64),
        fat_target_g: record.fat_target_g.as_ref().map(decimal_to_f64),
        daily_water_goal_ml: record.daily_water_goal_ml,
        gamification_enabled: record.gamification_enabled,
    }
}

/// Targets service
pub struct TargetsService;

impl TargetsService {
    /// The user's targets, falling back to defaults when no row exists
    pub(crate) async fn get_effective(db: &PgPool, user_id: Uuid) -> Result<UserTargets, ApiError> {
        let record = UserTargetsRepository::get(db, user_id).await?;
        Ok(record
            .map(|r| targets_from_record(&r))
            .unwrap_or_default())
    }

    /// Whether XP should be granted for this user's activity
    pub(crate) async fn gamification_enabled(db: &PgPool, user_id: Uuid) -> Result<bool, ApiError> {
        let record = UserTargetsRepository::get(db, user_id).await?;
        Ok(record.map(|r| r.gamification_enabled).unwrap_or(true))
    }

    /// Current targets with defaults resolved
    pub async fn get(db: &PgPool, user_id: Uuid) -> Result<TargetsResponse, ApiError> {
        let targets = Self::get_effective(db, user_id).await?;
        Ok(TargetsResponse::from(&targets))
    }

    /// Applies a partial update: present fields overwrite, absent fields
    /// keep their stored value
    pub async fn update(
        db: &PgPool,
        engine: &EngineHandle,
        user_id: Uuid,
        request: UpdateTargetsRequest,
    ) -> Result<TargetsResponse, ApiError> {
        request.validate()?;

        let current = Self::get_effective(db, user_id).await?;
        let merged = UpsertUserTargets {
            user_id,
            calorie_target: request.calorie_target.or(current.calorie_target),
            protein_target_g: request.protein_target_g.or(current.protein_target_g),
            carbs_target_g: request.carbs_target_g.or(current.carbs_target_g),
            fat_target_g: request.fat_target_g.or(current.fat_target_g),
            daily_water_goal_ml: request.daily_water_goal_ml.or(current.daily_water_goal_ml),
            gamification_enabled: request
                .gamification_enabled
                .unwrap_or(current.gamification_enabled),
        };

        let record = UserTargetsRepository::upsert(db, merged).await?;

        // Scores depend on targets, so published analytics are stale now
        engine.notify_data_changed(user_id).await;

        Ok(TargetsResponse::from(&targets_from_record(&record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_targets_from_record_maps_decimals() {
        let record = UserTargetsRecord {
            user_id: Uuid::new_v4(),
            calorie_target: Some(Decimal::new(1800, 0)),
            protein_target_g: Some(Decimal::new(1305, 1)),
            carbs_target_g: None,
            fat_target_g: None,
            daily_water_goal_ml: Some(2500),
            gamification_enabled: false,
            updated_at: Utc::now(),
        };

        let targets = targets_from_record(&record);
        assert_eq!(targets.calorie_target, Some(1800.0));
        assert_eq!(targets.protein_target_g, Some(130.5));
        assert_eq!(targets.carbs_target_g, None);
        assert_eq!(targets.daily_water_goal_ml, Some(2500));
        assert!(!targets.gamification_enabled);
    }

    #[test]
    fn test_unset_fields_resolve_to_defaults_in_response() {
        let record = UserTargetsRecord {
            user_id: Uuid::new_v4(),
            calorie_target: None,
            protein_target_g: None,
            carbs_target_g: None,
            fat_target_g: None,
            daily_water_goal_ml: None,
            gamification_enabled: true,
            updated_at: Utc::now(),
        };

        let response = TargetsResponse::from(&targets_from_record(&record));
        assert_eq!(response.calorie_target, 2000.0);
        assert_eq!(response.protein_target_g, 120.0);
        assert_eq!(response.daily_water_goal_ml, 2000);
    }
}
