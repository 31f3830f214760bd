//! Sync settings model (singleton row)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Primary key of the only settings row
pub const SETTINGS_ROW_ID: i16 = 1;

/// Sync settings database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(skip_serializing)]
    pub id: i16,
    pub sync_schedule: String,
    pub inactivity_threshold_days: i32,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
