use thiserror::Error;

use crate::model::ids::QuizId;

/// Upper bound on questions asked in a single attempt.
pub const QUIZ_QUESTION_LIMIT: usize = 10;

const UNTITLED_QUIZ: &str = "Untitled Quiz";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question text cannot be empty")]
    EmptyQuestion,

    #[error("question must offer at least one option")]
    NoOptions,

    #[error("correct answer is not one of the options")]
    AnswerNotInOptions,

    #[error("quiz has no questions")]
    NoQuestions,

    #[error("quiz attempt already completed")]
    AlreadyCompleted,
}

/// Multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    question: String,
    options: Vec<String>,
    correct_answer: String,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuizError` if the text is blank, there are no options, or the
    /// correct answer is not among the options.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuizError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QuizError::EmptyQuestion);
        }
        if options.is_empty() {
            return Err(QuizError::NoOptions);
        }
        let correct_answer = correct_answer.into();
        if !options.contains(&correct_answer) {
            return Err(QuizError::AnswerNotInOptions);
        }
        Ok(Self {
            question,
            options,
            correct_answer,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_answer == choice
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn new(id: QuizId, title: impl Into<String>, questions: Vec<Question>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED_QUIZ.to_owned()
        } else {
            title.trim().to_owned()
        };
        Self {
            id,
            title,
            questions,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

/// Result of answering the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub finished: bool,
}

/// One run through a quiz: questions are asked in order and scored as answered.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    quiz_id: QuizId,
    questions: Vec<Question>,
    current: usize,
    score: u32,
}

impl QuizAttempt {
    /// Start an attempt over an already-ordered question list.
    ///
    /// Questions past `QUIZ_QUESTION_LIMIT` are dropped.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if `questions` is empty.
    pub fn new(quiz_id: QuizId, mut questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        questions.truncate(QUIZ_QUESTION_LIMIT);
        Ok(Self {
            quiz_id,
            questions,
            current: 0,
            score: 0,
        })
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Zero-based index of the current question.
    #[must_use]
    pub fn position(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Answer the current question and advance.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyCompleted` once every question was answered.
    pub fn answer(&mut self, choice: &str) -> Result<AnswerOutcome, QuizError> {
        let question = self
            .questions
            .get(self.current)
            .ok_or(QuizError::AlreadyCompleted)?;
        let correct = question.is_correct(choice);
        if correct {
            self.score = self.score.saturating_add(1);
        }
        self.current += 1;
        Ok(AnswerOutcome {
            correct,
            finished: self.is_complete(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(n: usize) -> Question {
        Question::new(
            format!("Q{n}"),
            vec!["a".into(), "b".into()],
            if n % 2 == 0 { "a" } else { "b" },
        )
        .unwrap()
    }

    #[test]
    fn question_requires_answer_among_options() {
        let err = Question::new("2 + 2?", vec!["3".into(), "5".into()], "4").unwrap_err();
        assert_eq!(err, QuizError::AnswerNotInOptions);
        assert_eq!(
            Question::new("x", vec![], "a").unwrap_err(),
            QuizError::NoOptions
        );
    }

    #[test]
    fn blank_quiz_title_gets_placeholder() {
        let quiz = Quiz::new(QuizId::new(1), "  ", vec![question(0)]);
        assert_eq!(quiz.title(), "Untitled Quiz");
    }

    #[test]
    fn attempt_is_capped_and_scored() {
        let questions = (0..15).map(question).collect();
        let mut attempt = QuizAttempt::new(QuizId::new(1), questions).unwrap();
        assert_eq!(attempt.total(), QUIZ_QUESTION_LIMIT);

        let mut last = None;
        while !attempt.is_complete() {
            let outcome = attempt.answer("a").unwrap();
            last = Some(outcome);
        }
        assert!(last.unwrap().finished);
        assert_eq!(attempt.score(), 5);
        assert_eq!(attempt.answer("a").unwrap_err(), QuizError::AlreadyCompleted);
    }

    #[test]
    fn empty_attempt_is_rejected() {
        assert_eq!(
            QuizAttempt::new(QuizId::new(1), vec![]).unwrap_err(),
            QuizError::NoQuestions
        );
    }
}
