//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default deployment environment
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Environment name that hides error details from responses
pub const PRODUCTION_ENVIRONMENT: &str = "production";

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// CODEFORCES API
// =============================================================================

/// Public Codeforces API root
pub const DEFAULT_CODEFORCES_API_URL: &str = "https://codeforces.com/api";

/// HTTP timeout for a single Codeforces call
pub const DEFAULT_CODEFORCES_TIMEOUT_SECS: u64 = 30;

/// Budget for the sync run inside a create or update request
pub const DEFAULT_INLINE_SYNC_TIMEOUT_SECS: u64 = 45;

/// Number of most recent submissions pulled per student
pub const SUBMISSIONS_FETCH_COUNT: u32 = 1000;

/// User agent sent with every platform request
pub const USER_AGENT: &str = concat!("cftrack/", env!("CARGO_PKG_VERSION"));

/// Codeforces verdicts
pub mod verdicts {
    pub const OK: &str = "OK";
}

/// Codeforces rank given to handles without a rated contest
pub const UNRATED_RANK: &str = "unrated";

// =============================================================================
// SYNC DEFAULTS
// =============================================================================

/// Default cron expression: every day at 02:00 UTC
pub const DEFAULT_SYNC_SCHEDULE: &str = "0 2 * * *";

/// Courtesy delay between calls made for one student
pub const DEFAULT_SYNC_REQUEST_DELAY_MS: u64 = 500;

/// Courtesy delay between two students
pub const DEFAULT_SYNC_STUDENT_DELAY_MS: u64 = 2000;

/// A snapshot younger than this is not refetched by an unforced sync
pub const SNAPSHOT_FRESHNESS_HOURS: i64 = 6;

// =============================================================================
// STATISTICS
// =============================================================================

/// Day window used when the query does not carry a usable one
pub const DEFAULT_DAYS_WINDOW: i64 = 30;

/// Largest accepted day window (one century)
pub const MAX_DAYS_WINDOW: i64 = 36_500;

/// Width of a problem rating bucket
pub const RATING_BUCKET_SIZE: i32 = 100;

// =============================================================================
// INACTIVITY REMINDERS
// =============================================================================

/// Days without a submission before a student counts as inactive
pub const DEFAULT_INACTIVITY_THRESHOLD_DAYS: i32 = 7;

/// Largest accepted inactivity threshold, matching the stats window cap
pub const MAX_INACTIVITY_THRESHOLD_DAYS: i32 = MAX_DAYS_WINDOW as i32;

/// Minimum days between two reminders to the same student
pub const REMINDER_COOLDOWN_DAYS: i64 = 7;

/// Reminder email subject
pub const REMINDER_SUBJECT: &str = "Reminder: Keep up with your coding practice!";

/// Sender display name when none is configured
pub const DEFAULT_MAIL_FROM_NAME: &str = "Student Progress Management System";

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum student name length
pub const MAX_NAME_LENGTH: u64 = 100;

/// Maximum phone number length
pub const MAX_PHONE_LENGTH: u64 = 32;

/// Codeforces handle length bounds
pub const MIN_HANDLE_LENGTH: usize = 3;
pub const MAX_HANDLE_LENGTH: usize = 24;
