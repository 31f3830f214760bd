//! Student handler implementations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    handlers::extract::AppJson,
    models::{CodeforcesSnapshot, StudentSummary},
    services::StudentService,
    state::AppState,
    utils::resolve_days,
};

use super::{
    request::{CreateStudentRequest, DaysQuery, UpdateStudentRequest},
    response::{
        ContestHistoryResponse, DeletedStudentResponse, ProblemStatsResponse,
        StudentDetailResponse, StudentResponse, ToggleEmailsResponse,
    },
};

/// List all students with their current ratings
pub async fn list_students(State(state): State<AppState>) -> AppResult<Json<Vec<StudentSummary>>> {
    let students = StudentService::list(state.db()).await?;
    Ok(Json(students))
}

/// Get a student and their stored Codeforces data
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StudentDetailResponse>> {
    let student = StudentService::get(state.db(), &id).await?;
    Ok(Json(student))
}

/// Register a new student
pub async fn create_student(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStudentRequest>,
) -> AppResult<(StatusCode, Json<StudentResponse>)> {
    let created = StudentService::create(state.db(), state.runner(), payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a student
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateStudentRequest>,
) -> AppResult<Json<StudentResponse>> {
    let updated = StudentService::update(state.db(), state.runner(), &id, payload).await?;
    Ok(Json(updated))
}

/// Delete a student
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeletedStudentResponse>> {
    StudentService::delete(state.db(), &id).await?;
    Ok(Json(DeletedStudentResponse { id }))
}

/// Flip the reminder opt-out flag
pub async fn toggle_emails(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ToggleEmailsResponse>> {
    let student = StudentService::toggle_emails(state.db(), &id).await?;

    Ok(Json(ToggleEmailsResponse {
        id: student.id,
        disable_emails: student.disable_emails,
    }))
}

pub async fn get_codeforces_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CodeforcesSnapshot>> {
    let snapshot = StudentService::codeforces(state.db(), &id).await?;
    Ok(Json(snapshot))
}

/// Contest history for the last `days` days
pub async fn get_contest_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DaysQuery>,
) -> AppResult<Json<ContestHistoryResponse>> {
    let days = resolve_days(query.days.as_deref());
    let history = StudentService::contests(state.db(), &id, days).await?;
    Ok(Json(history))
}

/// Problem-solving statistics for the last `days` days
pub async fn get_problem_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DaysQuery>,
) -> AppResult<Json<ProblemStatsResponse>> {
    let days = resolve_days(query.days.as_deref());
    let stats = StudentService::problems(state.db(), &id, days).await?;
    Ok(Json(stats))
}
