//! Student management handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, put},
    Router,
};

use crate::state::AppState;

/// Student routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_students).post(handler::create_student))
        .route(
            "/{id}",
            get(handler::get_student)
                .put(handler::update_student)
                .delete(handler::delete_student),
        )
        .route("/{id}/toggle-emails", put(handler::toggle_emails))
        .route("/{id}/codeforces", get(handler::get_codeforces_data))
        .route("/{id}/contests", get(handler::get_contest_history))
        .route("/{id}/problems", get(handler::get_problem_stats))
}
