//! Settings handler implementations

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    handlers::extract::AppJson,
    models::SyncSettings,
    services::SettingsService,
    state::AppState,
};

use super::{request::UpdateSettingsRequest, response::SyncStartedResponse};

/// Current sync settings
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<SyncSettings>> {
    let defaults = state.runner().defaults();
    let settings = SettingsService::get(state.db(), defaults).await?;
    Ok(Json(settings))
}

/// Change the schedule and/or inactivity threshold
pub async fn update_settings(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateSettingsRequest>,
) -> AppResult<Json<SyncSettings>> {
    let settings = SettingsService::update(
        state.db(),
        state.scheduler(),
        state.runner().defaults(),
        payload,
    )
    .await?;

    Ok(Json(settings))
}

/// Start a full sync in the background
pub async fn trigger_sync(State(state): State<AppState>) -> Json<SyncStartedResponse> {
    let runner = state.runner().clone();

    tokio::spawn(async move {
        runner.run_manual().await;
    });

    tracing::info!("Manual Codeforces sync triggered");

    Json(SyncStartedResponse {
        message: "Codeforces data sync started".to_string(),
    })
}
