//! Codeforces sync pipeline
//!
//! A run walks the students one at a time, pulls their platform data with a
//! courtesy delay between calls, and replaces each stored snapshot. A student
//! whose fetch fails is logged and skipped until the next run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    codeforces::{ContestPlatform, RatingChange, Submission},
    config::{SettingsDefaults, SyncOptions},
    constants::UNRATED_RANK,
    db::repositories::{SettingsRepository, SnapshotRepository, StudentRepository},
    error::AppResult,
    mailer::Mailer,
    models::{CodeforcesSnapshot, ContestResult, ProblemRef, SnapshotDraft, Student, SubmissionRecord},
    services::InactivityService,
    utils::{from_unix_seconds, now_utc, time::format_milliseconds},
};

/// What happened to one student during a sync
#[derive(Debug)]
pub enum SyncOutcome {
    /// Snapshot was fetched and stored
    Updated(CodeforcesSnapshot),
    /// Stored snapshot was recent enough and left alone
    Fresh(CodeforcesSnapshot),
}

/// Tally of a full run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub processed: usize,
    pub updated: usize,
    pub skipped_fresh: usize,
    pub failed: usize,
}

/// Sync service for platform data
pub struct SyncService;

impl SyncService {
    /// Fetch everything the tracker keeps about a handle
    pub async fn build_snapshot(
        platform: &dyn ContestPlatform,
        handle: &str,
        options: &SyncOptions,
    ) -> AppResult<SnapshotDraft> {
        let info = platform.user_info(handle).await?;
        tokio::time::sleep(options.request_delay).await;

        let rating_changes = platform.user_rating(handle).await?;
        tokio::time::sleep(options.request_delay).await;

        let submissions = platform.user_status(handle).await?;

        let mut contests: Vec<ContestResult> = rating_changes.iter().map(contest_result).collect();

        if options.count_unsolved {
            let solved = solved_indices_by_contest(&submissions);
            for contest in &mut contests {
                tokio::time::sleep(options.request_delay).await;
                contest.problems_unsolved = match platform.contest_problem_count(contest.contest_id).await {
                    Ok(total) => {
                        let solved = solved.get(&contest.contest_id).map_or(0, HashSet::len);
                        total.saturating_sub(solved) as i32
                    }
                    Err(e) => {
                        tracing::warn!(
                            handle,
                            contest_id = contest.contest_id,
                            error = %e,
                            "Could not count contest problems"
                        );
                        0
                    }
                };
            }
        }

        Ok(SnapshotDraft {
            handle: handle.to_string(),
            rating: info.rating.unwrap_or(0),
            max_rating: info.max_rating.unwrap_or(0),
            rank: info.rank.unwrap_or_else(|| UNRATED_RANK.to_string()),
            contests,
            submissions: submissions.iter().map(submission_record).collect(),
        })
    }

    /// Refresh one student's snapshot unless it is fresh and `force` is unset
    pub async fn sync_student(
        pool: &PgPool,
        platform: &dyn ContestPlatform,
        options: &SyncOptions,
        student: &Student,
        force: bool,
    ) -> AppResult<SyncOutcome> {
        if !force {
            if let Some(existing) = SnapshotRepository::find_by_student(pool, &student.id).await? {
                if existing.handle == student.codeforces_handle
                    && existing.is_fresh(now_utc(), options.freshness)
                {
                    tracing::debug!(handle = %student.codeforces_handle, "Snapshot is fresh, skipping");
                    return Ok(SyncOutcome::Fresh(existing));
                }
            }
        }

        tracing::info!(handle = %student.codeforces_handle, "Fetching Codeforces data");
        let draft = Self::build_snapshot(platform, &student.codeforces_handle, options).await?;
        let snapshot = SnapshotRepository::upsert(pool, &student.id, &draft).await?;

        tracing::info!(
            handle = %student.codeforces_handle,
            contests = snapshot.contests.len(),
            submissions = snapshot.submissions.len(),
            "Codeforces data updated"
        );

        Ok(SyncOutcome::Updated(snapshot))
    }

    /// Sync every student, one at a time
    pub async fn sync_all(
        pool: &PgPool,
        platform: &dyn ContestPlatform,
        options: &SyncOptions,
    ) -> AppResult<SyncReport> {
        SettingsRepository::touch_last_sync(pool).await?;

        let students = StudentRepository::list_all(pool).await?;
        tracing::info!(students = students.len(), "Starting Codeforces sync");

        let mut report = SyncReport::default();
        for student in &students {
            report.processed += 1;

            match Self::sync_student(pool, platform, options, student, false).await {
                Ok(SyncOutcome::Updated(_)) => {
                    report.updated += 1;
                    tokio::time::sleep(options.student_delay).await;
                }
                Ok(SyncOutcome::Fresh(_)) => report.skipped_fresh += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        student = %student.name,
                        handle = %student.codeforces_handle,
                        error = %e,
                        "Sync failed for student, continuing"
                    );
                }
            }
        }

        Ok(report)
    }
}

/// Owns everything a background sync needs and keeps runs from overlapping
#[derive(Clone)]
pub struct SyncRunner {
    db: PgPool,
    platform: Arc<dyn ContestPlatform>,
    mailer: Arc<dyn Mailer>,
    options: SyncOptions,
    defaults: SettingsDefaults,
    running: Arc<Mutex<()>>,
}

impl SyncRunner {
    pub fn new(
        db: PgPool,
        platform: Arc<dyn ContestPlatform>,
        mailer: Arc<dyn Mailer>,
        options: SyncOptions,
        defaults: SettingsDefaults,
    ) -> Self {
        Self {
            db,
            platform,
            mailer,
            options,
            defaults,
            running: Arc::new(Mutex::new(())),
        }
    }

    pub fn platform(&self) -> &dyn ContestPlatform {
        self.platform.as_ref()
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn defaults(&self) -> &SettingsDefaults {
        &self.defaults
    }

    /// Whether a run currently holds the lock
    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Claim the run lock, or `None` while another run holds it
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, ()>> {
        self.running.try_lock().ok()
    }

    /// Cron entry point: sync everyone, then send inactivity reminders
    ///
    /// Returns `None` when another run holds the lock or the sync itself failed.
    pub async fn run_scheduled(&self) -> Option<SyncReport> {
        let Some(_guard) = self.try_acquire() else {
            tracing::warn!("Previous sync still running, skipping scheduled run");
            return None;
        };

        let started = Instant::now();
        let report = match SyncService::sync_all(&self.db, self.platform(), &self.options).await {
            Ok(report) => {
                log_report(&report, started);
                Some(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled sync failed");
                None
            }
        };

        match InactivityService::check_all(&self.db, self.mailer(), &self.defaults).await {
            Ok(sent) => tracing::info!(sent, "Inactivity check complete"),
            Err(e) => tracing::error!(error = %e, "Inactivity check failed"),
        }

        report
    }

    /// Manual trigger: sync everyone and stamp completion time
    pub async fn run_manual(&self) -> Option<SyncReport> {
        let Some(_guard) = self.try_acquire() else {
            tracing::warn!("Sync already running, ignoring manual trigger");
            return None;
        };

        let started = Instant::now();
        match SyncService::sync_all(&self.db, self.platform(), &self.options).await {
            Ok(report) => {
                log_report(&report, started);
                if let Err(e) = SettingsRepository::touch_last_sync(&self.db).await {
                    tracing::error!(error = %e, "Could not record sync completion");
                }
                Some(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Manual sync failed");
                None
            }
        }
    }
}

fn log_report(report: &SyncReport, started: Instant) {
    tracing::info!(
        processed = report.processed,
        updated = report.updated,
        skipped_fresh = report.skipped_fresh,
        failed = report.failed,
        elapsed = %format_milliseconds(started.elapsed().as_millis() as i64),
        "Codeforces sync finished"
    );
}

fn contest_result(change: &RatingChange) -> ContestResult {
    ContestResult {
        contest_id: change.contest_id,
        contest_name: change.contest_name.clone(),
        rank: change.rank,
        old_rating: change.old_rating,
        new_rating: change.new_rating,
        rating_change: change.new_rating - change.old_rating,
        date: from_unix_seconds(change.rating_update_time_seconds),
        problems_unsolved: 0,
    }
}

fn submission_record(sub: &Submission) -> SubmissionRecord {
    SubmissionRecord {
        submission_id: sub.id,
        contest_id: sub.contest_id,
        problem: ProblemRef {
            contest_id: sub.problem.contest_id,
            index: sub.problem.index.clone(),
            name: sub.problem.name.clone(),
            rating: sub.problem.rating,
            tags: sub.problem.tags.clone(),
        },
        verdict: sub.verdict.clone(),
        submitted_at: from_unix_seconds(sub.creation_time_seconds),
    }
}

/// Distinct accepted problem indices per contest
fn solved_indices_by_contest(submissions: &[Submission]) -> HashMap<i64, HashSet<&str>> {
    let mut solved: HashMap<i64, HashSet<&str>> = HashMap::new();
    for sub in submissions {
        if sub.verdict.as_deref() != Some(crate::constants::verdicts::OK) {
            continue;
        }
        if let Some(contest_id) = sub.contest_id {
            solved.entry(contest_id).or_default().insert(sub.problem.index.as_str());
        }
    }
    solved
}
