//! Student model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::REMINDER_COOLDOWN_DAYS;

/// Student database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub codeforces_handle: String,
    pub disable_emails: bool,
    pub emails_sent: i32,
    pub last_email_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student joined with the headline ratings of its snapshot
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub codeforces_handle: String,
    pub disable_emails: bool,
    pub emails_sent: i32,
    pub current_rating: i32,
    pub max_rating: i32,
    pub last_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Check if a reminder went out within the cooldown window
    pub fn recently_emailed(&self, now: DateTime<Utc>) -> bool {
        self.last_email_sent_at
            .map(|sent| now - sent < Duration::days(REMINDER_COOLDOWN_DAYS))
            .unwrap_or(false)
    }
}

/// Validated, normalized fields for a new student
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub codeforces_handle: String,
}

/// Validated, normalized partial update
#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub codeforces_handle: Option<String>,
    pub disable_emails: Option<bool>,
}
