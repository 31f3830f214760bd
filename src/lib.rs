//! cftrack - Student Codeforces progress tracker
//!
//! Keeps a roster of students, mirrors each one's Codeforces profile,
//! contest history and submissions on a cron schedule, derives contest and
//! problem-solving statistics, and emails students who stop practicing.
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic, including the sync pipeline
//! - **Repositories**: Database access
//! - **Codeforces / Mailer**: outbound integrations behind traits
//! - **Scheduler**: cron timer driving the periodic sync

pub mod codeforces;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

use constants::API_BASE_PATH;

/// Upper bound for a single request; syncs run in the background
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the full HTTP router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest(API_BASE_PATH, handlers::routes())
        .layer(from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
