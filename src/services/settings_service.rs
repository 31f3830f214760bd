//! Settings service

use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::SettingsDefaults,
    db::repositories::SettingsRepository,
    error::AppResult,
    handlers::settings::request::UpdateSettingsRequest,
    models::SyncSettings,
    scheduler::SyncScheduler,
};

/// Settings service for the sync singleton
pub struct SettingsService;

impl SettingsService {
    pub async fn get(pool: &PgPool, defaults: &SettingsDefaults) -> AppResult<SyncSettings> {
        SettingsRepository::get_or_create(
            pool,
            &defaults.sync_schedule,
            defaults.inactivity_threshold_days,
        )
        .await
    }

    /// Validate, reschedule, then persist
    ///
    /// A rejected cron expression leaves both the running job and the stored
    /// row untouched.
    pub async fn update(
        pool: &PgPool,
        scheduler: &SyncScheduler,
        defaults: &SettingsDefaults,
        req: UpdateSettingsRequest,
    ) -> AppResult<SyncSettings> {
        req.validate()?;

        // Make sure the row exists before updating it
        Self::get(pool, defaults).await?;

        let schedule = req.sync_schedule.as_deref().map(str::trim);
        if let Some(expr) = schedule {
            scheduler.reschedule(expr).await?;
        }

        let settings =
            SettingsRepository::update(pool, schedule, req.inactivity_threshold_days).await?;

        tracing::info!(
            schedule = %settings.sync_schedule,
            threshold_days = settings.inactivity_threshold_days,
            "Sync settings updated"
        );

        Ok(settings)
    }
}
