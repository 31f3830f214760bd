//! Input validation utilities

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{DEFAULT_DAYS_WINDOW, MAX_DAYS_WINDOW, MAX_HANDLE_LENGTH, MIN_HANDLE_LENGTH};

static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("handle pattern is valid"));

/// Validate Codeforces handle format
pub fn validate_handle(handle: &str) -> Result<(), &'static str> {
    if handle.len() < MIN_HANDLE_LENGTH {
        return Err("Codeforces handle must be at least 3 characters");
    }
    if handle.len() > MAX_HANDLE_LENGTH {
        return Err("Codeforces handle must be at most 24 characters");
    }
    if !HANDLE_PATTERN.is_match(handle) {
        return Err("Codeforces handle can only contain letters, numbers, '_', '-' and '.'");
    }
    Ok(())
}

/// Sanitize string input (remove control characters, trim whitespace)
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Trim and lower-case an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Day window from a raw query value; anything unusable falls back to the default
pub fn resolve_days(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(days) if days > 0 => days.min(MAX_DAYS_WINDOW),
        _ => DEFAULT_DAYS_WINDOW,
    }
}
