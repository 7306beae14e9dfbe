use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tutor_core::model::{
    Course, CourseTitle, Email, EnrollmentRecord, Quiz, QuizId, UserId, UserProfile,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read/write access to the course catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Persist or replace a course definition, keyed by title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a course by title.
    ///
    /// Returns `Ok(None)` when no course has that title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails or the stored document is malformed.
    async fn get_course(&self, title: &CourseTitle) -> Result<Option<Course>, StorageError>;

    /// List every course ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails or a stored document is malformed.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;
}

/// Per-user enrollment records.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Fetch the record for `(user, title)`.
    ///
    /// Returns `Ok(None)` when the user is not enrolled; read failures are `Err`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails or the stored document is malformed.
    async fn get_enrollment(
        &self,
        user: UserId,
        title: &CourseTitle,
    ) -> Result<Option<EnrollmentRecord>, StorageError>;

    /// Write the full record, overwriting any previous version.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_enrollment(&self, record: &EnrollmentRecord) -> Result<(), StorageError>;

    /// All enrollments of `user`, ordered by course title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails or a stored document is malformed.
    async fn list_enrollments(&self, user: UserId) -> Result<Vec<EnrollmentRecord>, StorageError>;
}

/// Registered accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email or id is already taken.
    async fn insert_user(&self, user: &UserProfile) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn get_user_by_email(&self, email: &Email) -> Result<Option<UserProfile>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StorageError>;
}

/// Quiz bank.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the read fails or the stored document is malformed.
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError>;

    /// All quizzes ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails or a stored document is malformed.
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<BTreeMap<CourseTitle, Course>>>,
    enrollments: Arc<Mutex<BTreeMap<(UserId, CourseTitle), EnrollmentRecord>>>,
    users: Arc<Mutex<HashMap<UserId, UserProfile>>>,
    quizzes: Arc<Mutex<BTreeMap<QuizId, Quiz>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = self.courses.lock().map_err(poisoned)?;
        guard.insert(course.title().clone(), course.clone());
        Ok(())
    }

    async fn get_course(&self, title: &CourseTitle) -> Result<Option<Course>, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        Ok(guard.get(title).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryRepository {
    async fn get_enrollment(
        &self,
        user: UserId,
        title: &CourseTitle,
    ) -> Result<Option<EnrollmentRecord>, StorageError> {
        let guard = self.enrollments.lock().map_err(poisoned)?;
        Ok(guard.get(&(user, title.clone())).cloned())
    }

    async fn save_enrollment(&self, record: &EnrollmentRecord) -> Result<(), StorageError> {
        let mut guard = self.enrollments.lock().map_err(poisoned)?;
        guard.insert(
            (record.user_id(), record.course_title().clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn list_enrollments(&self, user: UserId) -> Result<Vec<EnrollmentRecord>, StorageError> {
        let guard = self.enrollments.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|((owner, _), _)| *owner == user)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        let taken = guard.contains_key(&user.id())
            || guard.values().any(|existing| existing.email() == user.email());
        if taken {
            return Err(StorageError::Conflict);
        }
        guard.insert(user.id(), user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<UserProfile>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.values().find(|u| u.email() == email).cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let mut guard = self.quizzes.lock().map_err(poisoned)?;
        guard.insert(quiz.id(), quiz.clone());
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let guard = self.quizzes.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StorageError> {
        let guard = self.quizzes.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            catalog: Arc::new(repo.clone()),
            enrollments: Arc::new(repo.clone()),
            users: Arc::new(repo.clone()),
            quizzes: Arc::new(repo),
        }
    }
}
