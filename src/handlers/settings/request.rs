//! Settings request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::MAX_INACTIVITY_THRESHOLD_DAYS;

/// Update settings request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    /// Five- or six-field cron expression, evaluated in UTC
    pub sync_schedule: Option<String>,

    #[validate(range(
        min = 1,
        max = MAX_INACTIVITY_THRESHOLD_DAYS,
        message = "Inactivity threshold must be between 1 and 36500 days"
    ))]
    pub inactivity_threshold_days: Option<i32>,
}
