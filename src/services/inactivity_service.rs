//! Inactivity reminder pass

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::{
    config::SettingsDefaults,
    db::repositories::{SettingsRepository, SnapshotRepository, StudentRepository},
    error::AppResult,
    mailer::{MailError, Mailer, inactivity_reminder},
    models::{CodeforcesSnapshot, Student},
    utils::now_utc,
};

/// What the pass should do for one student
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderDecision {
    /// Never synced, nothing to judge
    NoSnapshot,
    Active,
    /// Inactive, but a reminder already went out within the cooldown
    RecentlyEmailed,
    Remind,
}

/// Inactivity service
pub struct InactivityService;

impl InactivityService {
    /// Decide whether `student` gets a reminder
    pub fn reminder_decision(
        student: &Student,
        snapshot: Option<&CodeforcesSnapshot>,
        threshold_days: i32,
        now: DateTime<Utc>,
    ) -> ReminderDecision {
        let Some(snapshot) = snapshot else {
            return ReminderDecision::NoSnapshot;
        };

        // A cutoff before the representable range means nothing is old enough
        let Some(cutoff) = now.checked_sub_signed(Duration::days(i64::from(threshold_days)))
        else {
            return ReminderDecision::Active;
        };

        if snapshot.has_submission_since(cutoff) {
            ReminderDecision::Active
        } else if student.recently_emailed(now) {
            ReminderDecision::RecentlyEmailed
        } else {
            ReminderDecision::Remind
        }
    }

    /// Email every inactive student who has reminders enabled
    ///
    /// Returns the number of reminders sent. A failed delivery is logged and
    /// the pass moves on.
    pub async fn check_all(
        pool: &PgPool,
        mailer: &dyn Mailer,
        defaults: &SettingsDefaults,
    ) -> AppResult<usize> {
        let settings = SettingsRepository::get_or_create(
            pool,
            &defaults.sync_schedule,
            defaults.inactivity_threshold_days,
        )
        .await?;

        let students = StudentRepository::list_email_enabled(pool).await?;
        let now = now_utc();
        let mut sent = 0;

        for student in &students {
            let snapshot = SnapshotRepository::find_by_student(pool, &student.id).await?;
            let decision = Self::reminder_decision(
                student,
                snapshot.as_ref(),
                settings.inactivity_threshold_days,
                now,
            );

            if decision != ReminderDecision::Remind {
                tracing::debug!(handle = %student.codeforces_handle, ?decision, "No reminder");
                continue;
            }

            match Self::send_reminder(pool, mailer, student).await {
                Ok(_) => sent += 1,
                Err(e) => tracing::error!(
                    student = %student.name,
                    email = %student.email,
                    error = %e,
                    "Failed to send inactivity reminder"
                ),
            }
        }

        Ok(sent)
    }

    /// Send one reminder and bump the student's counters
    pub async fn send_reminder(
        pool: &PgPool,
        mailer: &dyn Mailer,
        student: &Student,
    ) -> AppResult<Student> {
        deliver(mailer, student).await?;
        let updated = StudentRepository::record_email_sent(pool, &student.id).await?;

        tracing::info!(
            email = %student.email,
            emails_sent = updated.emails_sent,
            "Inactivity reminder sent"
        );

        Ok(updated)
    }
}

async fn deliver(mailer: &dyn Mailer, student: &Student) -> Result<(), MailError> {
    mailer.send(&inactivity_reminder(student)).await
}
