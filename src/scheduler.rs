//! Cron scheduler for the periodic sync
//!
//! Holds a single job at a time. Rescheduling builds the replacement first so
//! a bad expression never leaves the process without a running job.

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use crate::services::SyncRunner;

/// Scheduler errors
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid cron expression: {0}")]
    InvalidExpression(String),

    #[error("scheduler failure: {0}")]
    Scheduler(String),
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        SchedulerError::Scheduler(format!("{:?}", err))
    }
}

/// Accept 5-field (minute-first) or 6-field (second-first) cron expressions
///
/// The result always has six fields, with seconds first.
pub fn normalize_cron(expr: &str) -> Result<String, SchedulerError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 => Ok(fields.join(" ")),
        _ => Err(SchedulerError::InvalidExpression(expr.to_string())),
    }
}

/// Scheduler that runs the sync pipeline on a cron schedule
pub struct SyncScheduler {
    scheduler: JobScheduler,
    runner: SyncRunner,
    current: Mutex<Option<(Uuid, String)>>,
}

impl SyncScheduler {
    pub async fn new(runner: SyncRunner) -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            runner,
            current: Mutex::new(None),
        })
    }

    /// Install the sync job and start ticking
    pub async fn start(&self, expr: &str) -> Result<(), SchedulerError> {
        self.reschedule(expr).await?;
        self.scheduler.start().await?;
        Ok(())
    }

    /// Replace the sync job with one on `expr`
    ///
    /// An invalid expression is rejected and the current job keeps running.
    pub async fn reschedule(&self, expr: &str) -> Result<String, SchedulerError> {
        let normalized = normalize_cron(expr)?;
        let job = self.build_job(&normalized)?;

        let mut current = self.current.lock().await;
        let job_id = self.scheduler.add(job).await?;

        if let Some((old_id, old_expr)) = current.take() {
            if let Err(e) = self.scheduler.remove(&old_id).await {
                tracing::warn!(schedule = %old_expr, error = ?e, "Could not remove previous sync job");
            }
        }

        tracing::info!(schedule = %normalized, "Sync job scheduled");
        *current = Some((job_id, normalized.clone()));

        Ok(normalized)
    }

    /// Expression of the installed job, normalized to six fields
    pub async fn current_expression(&self) -> Option<String> {
        self.current.lock().await.as_ref().map(|(_, expr)| expr.clone())
    }

    /// Stop the scheduler
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        let mut scheduler = self.scheduler.clone();
        scheduler.shutdown().await?;
        Ok(())
    }

    fn build_job(&self, expr: &str) -> Result<Job, SchedulerError> {
        let runner = self.runner.clone();

        Job::new_async(expr, move |_uuid, _lock| {
            let runner = runner.clone();

            Box::pin(async move {
                tracing::info!("Running scheduled Codeforces sync");
                runner.run_scheduled().await;
            })
        })
        .map_err(|e| {
            tracing::debug!(error = ?e, "Rejected cron expression");
            SchedulerError::InvalidExpression(expr.to_string())
        })
    }
}
