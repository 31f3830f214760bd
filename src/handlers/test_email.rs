//! Manual reminder trigger

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    handlers::students::response::TestEmailResponse,
    services::{InactivityService, StudentService},
    state::AppState,
};

/// Send one inactivity reminder now, regardless of activity or cooldown
async fn send_test_email(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TestEmailResponse>> {
    let student = StudentService::find(state.db(), &id).await?;
    let updated =
        InactivityService::send_reminder(state.db(), state.runner().mailer(), &student).await?;

    Ok(Json(TestEmailResponse {
        success: true,
        message: format!("Reminder email sent to {}", updated.email),
        emails_sent: updated.emails_sent,
        last_email_sent_at: updated.last_email_sent_at,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/email/{id}", post(send_test_email))
}
