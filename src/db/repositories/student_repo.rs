//! Student repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{NewStudent, Student, StudentChanges, StudentSummary},
};

/// Repository for student database operations
pub struct StudentRepository;

impl StudentRepository {
    /// Create a new student
    pub async fn create(pool: &PgPool, student: &NewStudent) -> AppResult<Student> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (name, email, phone_number, codeforces_handle)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone_number)
        .bind(&student.codeforces_handle)
        .fetch_one(pool)
        .await?;

        Ok(student)
    }

    /// Find student by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(r#"SELECT * FROM students WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(student)
    }

    /// Find another student already using this email or handle
    pub async fn find_conflicting(
        pool: &PgPool,
        email: Option<&str>,
        handle: Option<&str>,
        exclude_id: Option<&Uuid>,
    ) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT * FROM students
            WHERE
                (email = $1 OR codeforces_handle = $2)
                AND ($3::uuid IS NULL OR id <> $3)
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(handle)
        .bind(exclude_id)
        .fetch_optional(pool)
        .await?;

        Ok(student)
    }

    /// List every student with the headline numbers of its snapshot
    pub async fn list_with_ratings(pool: &PgPool) -> AppResult<Vec<StudentSummary>> {
        let students = sqlx::query_as::<_, StudentSummary>(
            r#"
            SELECT
                s.id,
                s.name,
                s.email,
                s.phone_number,
                s.codeforces_handle,
                s.disable_emails,
                s.emails_sent,
                COALESCE(c.rating, 0) AS current_rating,
                COALESCE(c.max_rating, 0) AS max_rating,
                c.last_updated,
                s.created_at,
                s.updated_at
            FROM students s
            LEFT JOIN codeforces_snapshots c ON c.student_id = s.id
            ORDER BY s.name ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(students)
    }

    /// All students, in a stable order for the sync loop
    pub async fn list_all(pool: &PgPool) -> AppResult<Vec<Student>> {
        let students =
            sqlx::query_as::<_, Student>(r#"SELECT * FROM students ORDER BY created_at ASC"#)
                .fetch_all(pool)
                .await?;

        Ok(students)
    }

    /// Students that have not opted out of reminder emails
    pub async fn list_email_enabled(pool: &PgPool) -> AppResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"SELECT * FROM students WHERE disable_emails = FALSE ORDER BY created_at ASC"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(students)
    }

    /// Apply a partial update
    pub async fn update(pool: &PgPool, id: &Uuid, changes: &StudentChanges) -> AppResult<Student> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone_number = COALESCE($4, phone_number),
                codeforces_handle = COALESCE($5, codeforces_handle),
                disable_emails = COALESCE($6, disable_emails),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.phone_number)
        .bind(&changes.codeforces_handle)
        .bind(changes.disable_emails)
        .fetch_one(pool)
        .await?;

        Ok(student)
    }

    /// Delete a student (its snapshot goes with it)
    pub async fn delete(pool: &PgPool, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM students WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip the email opt-out flag
    pub async fn toggle_emails(pool: &PgPool, id: &Uuid) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET disable_emails = NOT disable_emails, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(student)
    }

    /// Count a delivered reminder
    pub async fn record_email_sent(pool: &PgPool, id: &Uuid) -> AppResult<Student> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET emails_sent = emails_sent + 1, last_email_sent_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(student)
    }
}
