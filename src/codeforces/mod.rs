//! Codeforces platform access
//!
//! The sync pipeline only talks to the platform through [`ContestPlatform`],
//! which keeps the HTTP client swappable in tests.

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::CodeforcesClient;
pub use types::{Problem, RatingChange, Submission, UserInfo};

/// Read-only operations the tracker needs from the contest platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContestPlatform: Send + Sync {
    /// Profile of a single handle (rating, max rating, rank)
    async fn user_info(&self, handle: &str) -> Result<UserInfo, CodeforcesError>;

    /// Rated contest history, oldest first
    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>, CodeforcesError>;

    /// Most recent submissions, newest first
    async fn user_status(&self, handle: &str) -> Result<Vec<Submission>, CodeforcesError>;

    /// Number of problems in a contest
    async fn contest_problem_count(&self, contest_id: i64) -> Result<usize, CodeforcesError>;
}

/// Codeforces client errors
#[derive(Debug, thiserror::Error)]
pub enum CodeforcesError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} answered with HTTP {status}")]
    Status { method: &'static str, status: u16 },

    #[error("{method} failed: {comment}")]
    Api { method: &'static str, comment: String },

    #[error("{0} returned no result")]
    EmptyResult(&'static str),

    #[error("handle {0} not found")]
    HandleNotFound(String),
}
