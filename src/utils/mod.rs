//! Utility functions

pub mod time;
pub mod validation;

pub use time::{day_key, from_unix_seconds, now_utc, window_start};
pub use validation::{normalize_email, resolve_days, sanitize_string, validate_handle};
