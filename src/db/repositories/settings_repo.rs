//! Sync settings repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{SETTINGS_ROW_ID, SyncSettings},
};

/// Repository for the singleton settings row
pub struct SettingsRepository;

impl SettingsRepository {
    /// Load the settings row, creating it with the given defaults if missing
    pub async fn get_or_create(
        pool: &PgPool,
        default_schedule: &str,
        default_threshold_days: i32,
    ) -> AppResult<SyncSettings> {
        sqlx::query(
            r#"
            INSERT INTO sync_settings (id, sync_schedule, inactivity_threshold_days)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(default_schedule)
        .bind(default_threshold_days)
        .execute(pool)
        .await?;

        let settings =
            sqlx::query_as::<_, SyncSettings>(r#"SELECT * FROM sync_settings WHERE id = $1"#)
                .bind(SETTINGS_ROW_ID)
                .fetch_one(pool)
                .await?;

        Ok(settings)
    }

    /// Update schedule and/or threshold
    pub async fn update(
        pool: &PgPool,
        sync_schedule: Option<&str>,
        inactivity_threshold_days: Option<i32>,
    ) -> AppResult<SyncSettings> {
        let settings = sqlx::query_as::<_, SyncSettings>(
            r#"
            UPDATE sync_settings
            SET
                sync_schedule = COALESCE($2, sync_schedule),
                inactivity_threshold_days = COALESCE($3, inactivity_threshold_days),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(sync_schedule)
        .bind(inactivity_threshold_days)
        .fetch_one(pool)
        .await?;

        Ok(settings)
    }

    /// Stamp the time of the latest sync run
    pub async fn touch_last_sync(pool: &PgPool) -> AppResult<()> {
        sqlx::query(
            r#"UPDATE sync_settings SET last_sync_at = NOW(), updated_at = NOW() WHERE id = $1"#,
        )
        .bind(SETTINGS_ROW_ID)
        .execute(pool)
        .await?;

        Ok(())
    }
}
