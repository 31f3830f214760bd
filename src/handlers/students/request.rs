//! Student request DTOs
//!
//! Fields are optional at the serde level so a missing field yields the
//! service's own 400 message instead of a JSON rejection.

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_NAME_LENGTH, MAX_PHONE_LENGTH};

/// Create student request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(max = MAX_NAME_LENGTH, message = "Name is too long"))]
    pub name: Option<String>,

    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,

    #[validate(length(max = MAX_PHONE_LENGTH, message = "Phone number is too long"))]
    pub phone_number: Option<String>,

    pub codeforces_handle: Option<String>,
}

/// Update student request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = MAX_PHONE_LENGTH, message = "Phone number must be 1-32 characters"))]
    pub phone_number: Option<String>,

    pub codeforces_handle: Option<String>,

    pub disable_emails: Option<bool>,
}

/// `?days=N` window; kept as text so junk values fall back to the default
#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    pub days: Option<String>,
}
