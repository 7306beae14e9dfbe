use async_trait::async_trait;
use tutor_core::model::{Course, CourseTitle};

use super::SqliteRepository;
use super::mapping::{conn, map_course_row};
use crate::documents::encode_chapters;
use crate::repository::{CatalogRepository, StorageError};

#[async_trait]
impl CatalogRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let chapters = encode_chapters(course.chapters())?;

        sqlx::query(
            r"
            INSERT INTO courses (title, description, category, chapter_count, chapters)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(title) DO UPDATE SET
                description = excluded.description,
                category = excluded.category,
                chapter_count = excluded.chapter_count,
                chapters = excluded.chapters
            ",
        )
        .bind(course.title().as_str())
        .bind(course.description())
        .bind(course.category())
        .bind(i64::from(course.chapter_count()))
        .bind(chapters)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_course(&self, title: &CourseTitle) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT title, description, category, chapter_count, chapters
            FROM courses WHERE title = ?1
            ",
        )
        .bind(title.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_course_row).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT title, description, category, chapter_count, chapters
            FROM courses
            ORDER BY title ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_course_row).collect()
    }
}
