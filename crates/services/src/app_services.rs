use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::account_service::AccountService;
use crate::catalog_service::CatalogService;
use crate::code_runner::CodeRunnerService;
use crate::enrollment_service::EnrollmentService;
use crate::error::AppServicesError;
use crate::quiz_service::QuizService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    enrollments: Arc<EnrollmentService>,
    accounts: Arc<AccountService>,
    quizzes: Arc<QuizService>,
    code_runner: Arc<CodeRunnerService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, with the code runner
    /// configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, CodeRunnerService::from_env()))
    }

    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, code_runner: CodeRunnerService) -> Self {
        let catalog = Arc::new(CatalogService::new(Arc::clone(&storage.catalog)));
        let enrollments = Arc::new(EnrollmentService::new(
            clock,
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.enrollments),
        ));
        let accounts = Arc::new(AccountService::new(clock, Arc::clone(&storage.users)));
        let quizzes = Arc::new(QuizService::new(Arc::clone(&storage.quizzes)));

        tracing::debug!(code_runner = code_runner.enabled(), "services assembled");
        Self {
            catalog,
            enrollments,
            accounts,
            quizzes,
            code_runner: Arc::new(code_runner),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn enrollments(&self) -> Arc<EnrollmentService> {
        Arc::clone(&self.enrollments)
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn code_runner(&self) -> Arc<CodeRunnerService> {
        Arc::clone(&self.code_runner)
    }
}
