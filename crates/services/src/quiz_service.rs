use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use storage::repository::QuizRepository;
use tutor_core::model::{Quiz, QuizAttempt, QuizId};

use crate::error::QuizServiceError;

/// Quiz listing and attempt setup.
#[derive(Clone)]
pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { quizzes }
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn list_quizzes(&self) -> Result<Vec<Quiz>, QuizServiceError> {
        let quizzes = self.quizzes.list_quizzes().await?;
        Ok(quizzes)
    }

    /// Start an attempt over a shuffled selection of the quiz's questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotFound` for an unknown id,
    /// `QuizServiceError::Quiz` when the quiz has no questions, and
    /// `QuizServiceError::Storage` if repository access fails.
    pub async fn start_attempt<R: Rng + ?Sized>(
        &self,
        quiz_id: QuizId,
        rng: &mut R,
    ) -> Result<QuizAttempt, QuizServiceError> {
        let quiz = self
            .quizzes
            .get_quiz(quiz_id)
            .await?
            .ok_or(QuizServiceError::NotFound)?;

        let mut questions = quiz.questions().to_vec();
        questions.shuffle(rng);
        let attempt = QuizAttempt::new(quiz_id, questions)?;
        tracing::debug!(quiz = %quiz_id, questions = attempt.total(), "quiz attempt started");
        Ok(attempt)
    }
}
