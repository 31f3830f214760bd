//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod extract;
pub mod health;
pub mod settings;
pub mod students;
pub mod test_email;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/students", students::routes())
        .nest("/config", settings::routes())
        .nest("/test", test_email::routes())
}
