use async_trait::async_trait;
use tutor_core::model::{Quiz, QuizId};

use super::SqliteRepository;
use super::mapping::{conn, map_quiz_row, quiz_id_to_i64};
use crate::documents::encode_questions;
use crate::repository::{QuizRepository, StorageError};

#[async_trait]
impl QuizRepository for SqliteRepository {
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let questions = encode_questions(quiz.questions())?;

        sqlx::query(
            r"
            INSERT INTO quizzes (id, title, questions)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                questions = excluded.questions
            ",
        )
        .bind(quiz_id_to_i64(quiz.id())?)
        .bind(quiz.title())
        .bind(questions)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let row = sqlx::query("SELECT id, title, questions FROM quizzes WHERE id = ?1")
            .bind(quiz_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_quiz_row).transpose()
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StorageError> {
        let rows = sqlx::query("SELECT id, title, questions FROM quizzes ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_quiz_row).collect()
    }
}
