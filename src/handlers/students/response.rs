//! Student response DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{CodeforcesSnapshot, ContestResult, ProblemRef, Student};

/// Student with its full snapshot
#[derive(Debug, Serialize)]
pub struct StudentDetailResponse {
    #[serde(flatten)]
    pub student: Student,
    pub cf_data: Option<CodeforcesSnapshot>,
}

/// Result of a create or update; `cf_error` is set when the immediate fetch failed
#[derive(Debug, Serialize)]
pub struct StudentResponse {
    #[serde(flatten)]
    pub student: Student,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cf_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedStudentResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ToggleEmailsResponse {
    pub id: Uuid,
    pub disable_emails: bool,
}

/// One point of the rating graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingPoint {
    pub contest_id: i64,
    pub contest_name: String,
    pub date: DateTime<Utc>,
    pub new_rating: i32,
}

/// Contest history inside a day window
#[derive(Debug, Serialize)]
pub struct ContestHistoryResponse {
    pub handle: String,
    pub rating: i32,
    pub max_rating: i32,
    pub rank: String,
    /// Most recent first
    pub contests: Vec<ContestResult>,
    /// Oldest first, for plotting
    pub rating_points: Vec<RatingPoint>,
}

/// Problem-solving statistics inside a day window
#[derive(Debug, Serialize)]
pub struct ProblemStatsResponse {
    pub most_difficult_problem: Option<ProblemRef>,
    pub total_problems_solved: usize,
    pub average_rating: i32,
    pub average_problems_per_day: f64,
    /// Rating bucket (multiple of 100) to number of problems
    pub problems_by_rating: BTreeMap<i32, usize>,
    /// `YYYY-MM-DD` to number of problems first solved that day
    pub submission_heatmap: BTreeMap<String, usize>,
}

/// Outcome of a manually triggered reminder
#[derive(Debug, Serialize)]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: String,
    pub emails_sent: i32,
    pub last_email_sent_at: Option<DateTime<Utc>>,
}
