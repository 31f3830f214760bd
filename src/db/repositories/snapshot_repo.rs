//! Codeforces snapshot repository

use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CodeforcesSnapshot, SnapshotDraft},
};

/// Repository for snapshot database operations
pub struct SnapshotRepository;

impl SnapshotRepository {
    /// Find the snapshot of a student
    pub async fn find_by_student(
        pool: &PgPool,
        student_id: &Uuid,
    ) -> AppResult<Option<CodeforcesSnapshot>> {
        let snapshot = sqlx::query_as::<_, CodeforcesSnapshot>(
            r#"SELECT * FROM codeforces_snapshots WHERE student_id = $1"#,
        )
        .bind(student_id)
        .fetch_optional(pool)
        .await?;

        Ok(snapshot)
    }

    /// Insert or fully replace the snapshot of a student
    pub async fn upsert(
        pool: &PgPool,
        student_id: &Uuid,
        draft: &SnapshotDraft,
    ) -> AppResult<CodeforcesSnapshot> {
        let snapshot = sqlx::query_as::<_, CodeforcesSnapshot>(
            r#"
            INSERT INTO codeforces_snapshots
                (student_id, handle, rating, max_rating, rank, contests, submissions, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (student_id) DO UPDATE
            SET
                handle = EXCLUDED.handle,
                rating = EXCLUDED.rating,
                max_rating = EXCLUDED.max_rating,
                rank = EXCLUDED.rank,
                contests = EXCLUDED.contests,
                submissions = EXCLUDED.submissions,
                last_updated = EXCLUDED.last_updated,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(&draft.handle)
        .bind(draft.rating)
        .bind(draft.max_rating)
        .bind(&draft.rank)
        .bind(Json(&draft.contests))
        .bind(Json(&draft.submissions))
        .fetch_one(pool)
        .await?;

        Ok(snapshot)
    }

    /// Remove the snapshot of a student
    pub async fn delete_for_student(pool: &PgPool, student_id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM codeforces_snapshots WHERE student_id = $1"#)
            .bind(student_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
