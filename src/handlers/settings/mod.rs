//! Sync settings handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Settings routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::get_settings).put(handler::update_settings))
        .route("/sync", post(handler::trigger_sync))
}
