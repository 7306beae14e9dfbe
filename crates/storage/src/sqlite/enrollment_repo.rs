use async_trait::async_trait;
use tutor_core::model::{CourseTitle, EnrollmentRecord, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_enrollment_row};
use crate::documents::encode_progress;
use crate::repository::{EnrollmentRepository, StorageError};

#[async_trait]
impl EnrollmentRepository for SqliteRepository {
    async fn get_enrollment(
        &self,
        user: UserId,
        title: &CourseTitle,
    ) -> Result<Option<EnrollmentRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, course_title, description, category, chapter_count, chapters, enrolled_at
            FROM enrollments
            WHERE user_id = ?1 AND course_title = ?2
            ",
        )
        .bind(user.to_string())
        .bind(title.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_enrollment_row).transpose()
    }

    async fn save_enrollment(&self, record: &EnrollmentRecord) -> Result<(), StorageError> {
        let chapters = encode_progress(record.chapters())?;

        // enrolled_at is fixed at creation and left out of the update set.
        sqlx::query(
            r"
            INSERT INTO enrollments (user_id, course_title, description, category, chapter_count, chapters, enrolled_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id, course_title) DO UPDATE SET
                description = excluded.description,
                category = excluded.category,
                chapter_count = excluded.chapter_count,
                chapters = excluded.chapters
            ",
        )
        .bind(record.user_id().to_string())
        .bind(record.course_title().as_str())
        .bind(record.description())
        .bind(record.category())
        .bind(i64::from(record.chapter_count()))
        .bind(chapters)
        .bind(record.enrolled_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn list_enrollments(&self, user: UserId) -> Result<Vec<EnrollmentRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, course_title, description, category, chapter_count, chapters, enrolled_at
            FROM enrollments
            WHERE user_id = ?1
            ORDER BY course_title ASC
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_enrollment_row).collect()
    }
}
