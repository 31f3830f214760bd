//! Application state management
//!
//! Shared state handed to every request handler through Axum's `State`
//! extractor.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{config::Config, scheduler::SyncScheduler, services::SyncRunner};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: PgPool,
    config: Config,
    runner: SyncRunner,
    scheduler: Arc<SyncScheduler>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, runner: SyncRunner, scheduler: Arc<SyncScheduler>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                config,
                runner,
                scheduler,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Sync pipeline shared with the cron job
    pub fn runner(&self) -> &SyncRunner {
        &self.inner.runner
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.inner.scheduler
    }
}
