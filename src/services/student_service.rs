//! Student service

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::repositories::{SnapshotRepository, StudentRepository},
    error::{AppError, AppResult},
    handlers::students::{
        request::{CreateStudentRequest, UpdateStudentRequest},
        response::{
            ContestHistoryResponse, ProblemStatsResponse, StudentDetailResponse, StudentResponse,
        },
    },
    models::{CodeforcesSnapshot, NewStudent, Student, StudentChanges, StudentSummary},
    services::{StatsService, SyncRunner, SyncService},
    utils::{normalize_email, now_utc, sanitize_string, validate_handle},
};

const DUPLICATE_STUDENT: &str = "Student with this email or Codeforces handle already exists";
const CREATE_SYNC_FAILED: &str = "Could not fetch Codeforces data. Will try again during next sync.";
const UPDATE_SYNC_FAILED: &str =
    "Could not fetch new Codeforces data. Will try again during next sync.";

/// Student service for CRUD and per-student statistics
pub struct StudentService;

impl StudentService {
    /// All students by name, with their headline ratings
    pub async fn list(pool: &PgPool) -> AppResult<Vec<StudentSummary>> {
        StudentRepository::list_with_ratings(pool).await
    }

    /// Student by ID, with its snapshot when one exists
    pub async fn get(pool: &PgPool, id: &Uuid) -> AppResult<StudentDetailResponse> {
        let student = Self::find(pool, id).await?;
        let cf_data = SnapshotRepository::find_by_student(pool, id).await?;

        Ok(StudentDetailResponse { student, cf_data })
    }

    /// Register a student and try to fetch their data right away
    pub async fn create(
        pool: &PgPool,
        runner: &SyncRunner,
        req: CreateStudentRequest,
    ) -> AppResult<StudentResponse> {
        let new_student = Self::new_student(req)?;

        if StudentRepository::find_conflicting(
            pool,
            Some(&new_student.email),
            Some(&new_student.codeforces_handle),
            None,
        )
        .await?
        .is_some()
        {
            return Err(AppError::AlreadyExists(DUPLICATE_STUDENT.to_string()));
        }

        let student = StudentRepository::create(pool, &new_student).await?;
        tracing::info!(id = %student.id, handle = %student.codeforces_handle, "Student created");

        let cf_error = Self::sync_now(pool, runner, &student, CREATE_SYNC_FAILED).await;

        Ok(StudentResponse { student, cf_error })
    }

    /// Apply a partial update; a changed handle triggers a forced sync
    pub async fn update(
        pool: &PgPool,
        runner: &SyncRunner,
        id: &Uuid,
        req: UpdateStudentRequest,
    ) -> AppResult<StudentResponse> {
        req.validate()?;

        let existing = Self::find(pool, id).await?;
        let changes = Self::changes(req)?;

        let email = changes.email.as_deref().filter(|e| *e != existing.email);
        let handle = changes
            .codeforces_handle
            .as_deref()
            .filter(|h| *h != existing.codeforces_handle);

        if (email.is_some() || handle.is_some())
            && StudentRepository::find_conflicting(pool, email, handle, Some(id))
                .await?
                .is_some()
        {
            return Err(AppError::AlreadyExists(DUPLICATE_STUDENT.to_string()));
        }

        let handle_changed = handle.is_some();
        let student = StudentRepository::update(pool, id, &changes).await?;

        let cf_error = if handle_changed {
            tracing::info!(
                id = %student.id,
                from = %existing.codeforces_handle,
                to = %student.codeforces_handle,
                "Codeforces handle changed"
            );
            Self::sync_now(pool, runner, &student, UPDATE_SYNC_FAILED).await
        } else {
            None
        };

        Ok(StudentResponse { student, cf_error })
    }

    /// Remove a student and its snapshot
    pub async fn delete(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        Self::find(pool, id).await?;

        SnapshotRepository::delete_for_student(pool, id).await?;
        if !StudentRepository::delete(pool, id).await? {
            return Err(AppError::NotFound("Student not found".to_string()));
        }

        tracing::info!(%id, "Student deleted");
        Ok(())
    }

    /// Flip the reminder opt-out flag
    pub async fn toggle_emails(pool: &PgPool, id: &Uuid) -> AppResult<Student> {
        StudentRepository::toggle_emails(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
    }

    /// Raw stored snapshot
    pub async fn codeforces(pool: &PgPool, id: &Uuid) -> AppResult<CodeforcesSnapshot> {
        Self::find(pool, id).await?;

        SnapshotRepository::find_by_student(pool, id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Codeforces data not found for this student".to_string())
            })
    }

    pub async fn contests(pool: &PgPool, id: &Uuid, days: i64) -> AppResult<ContestHistoryResponse> {
        let snapshot = Self::codeforces(pool, id).await?;
        Ok(StatsService::contest_history(&snapshot, days, now_utc()))
    }

    pub async fn problems(pool: &PgPool, id: &Uuid, days: i64) -> AppResult<ProblemStatsResponse> {
        let snapshot = Self::codeforces(pool, id).await?;
        Ok(StatsService::problem_stats(&snapshot, days, now_utc()))
    }

    /// Student by ID or 404
    pub async fn find(pool: &PgPool, id: &Uuid) -> AppResult<Student> {
        StudentRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
    }

    /// Forced sync whose failure is reported to the caller instead of raised
    ///
    /// The run is cut off after `inline_timeout` so the request still answers
    /// inside its own deadline. The next scheduled sync picks the student up.
    async fn sync_now(
        pool: &PgPool,
        runner: &SyncRunner,
        student: &Student,
        failure_message: &str,
    ) -> Option<String> {
        let options = runner.options();
        let sync = SyncService::sync_student(pool, runner.platform(), options, student, true);

        let error = match tokio::time::timeout(options.inline_timeout, sync).await {
            Ok(Ok(_)) => return None,
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", options.inline_timeout),
        };

        tracing::warn!(
            handle = %student.codeforces_handle,
            error = %error,
            "Immediate Codeforces fetch failed"
        );
        Some(failure_message.to_string())
    }

    fn new_student(req: CreateStudentRequest) -> AppResult<NewStudent> {
        let required = |field: Option<&String>| {
            field
                .map(|v| sanitize_string(v))
                .filter(|v| !v.is_empty())
        };

        let (Some(name), Some(email), Some(phone_number), Some(codeforces_handle)) = (
            required(req.name.as_ref()),
            required(req.email.as_ref()),
            required(req.phone_number.as_ref()),
            required(req.codeforces_handle.as_ref()),
        ) else {
            return Err(AppError::Validation(
                "Please provide all required fields".to_string(),
            ));
        };

        req.validate()?;
        validate_handle(&codeforces_handle).map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(NewStudent {
            name,
            email: normalize_email(&email),
            phone_number,
            codeforces_handle,
        })
    }

    fn changes(req: UpdateStudentRequest) -> AppResult<StudentChanges> {
        let codeforces_handle = req.codeforces_handle.map(|h| sanitize_string(&h));
        if let Some(handle) = &codeforces_handle {
            validate_handle(handle).map_err(|e| AppError::Validation(e.to_string()))?;
        }

        Ok(StudentChanges {
            name: req.name.map(|n| sanitize_string(&n)),
            email: req.email.map(|e| normalize_email(&e)),
            phone_number: req.phone_number.map(|p| sanitize_string(&p)),
            codeforces_handle,
            disable_emails: req.disable_emails,
        })
    }
}
