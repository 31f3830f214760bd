//! Codeforces snapshot model
//!
//! One snapshot per student holds everything the last sync pulled from the
//! platform. Contest results and submissions live in JSONB columns and are
//! always replaced as a whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

use crate::constants::verdicts;

/// Snapshot database model
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CodeforcesSnapshot {
    pub student_id: Uuid,
    pub handle: String,
    pub rating: i32,
    pub max_rating: i32,
    pub rank: String,
    pub contests: Json<Vec<ContestResult>>,
    pub submissions: Json<Vec<SubmissionRecord>>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CodeforcesSnapshot {
    /// Whether the snapshot was refreshed within `max_age` of `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.last_updated < max_age
    }

    /// Whether any submission, whatever its verdict, happened at or after `since`
    pub fn has_submission_since(&self, since: DateTime<Utc>) -> bool {
        self.submissions.iter().any(|s| s.submitted_at >= since)
    }
}

/// Freshly fetched data, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDraft {
    pub handle: String,
    pub rating: i32,
    pub max_rating: i32,
    pub rank: String,
    pub contests: Vec<ContestResult>,
    pub submissions: Vec<SubmissionRecord>,
}

/// A rated contest the student took part in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestResult {
    pub contest_id: i64,
    pub contest_name: String,
    pub rank: i64,
    pub old_rating: i32,
    pub new_rating: i32,
    pub rating_change: i32,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub problems_unsolved: i32,
}

/// Problem as referenced by a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRef {
    pub contest_id: Option<i64>,
    pub index: String,
    pub name: String,
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProblemRef {
    /// Identity of a problem across submissions
    pub fn key(&self) -> String {
        match self.contest_id {
            Some(contest_id) => format!("{}-{}", contest_id, self.index),
            None => format!("{}-{}", self.name, self.index),
        }
    }
}

/// A single judged submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: i64,
    pub contest_id: Option<i64>,
    pub problem: ProblemRef,
    pub verdict: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn is_accepted(&self) -> bool {
        self.verdict.as_deref() == Some(verdicts::OK)
    }
}
