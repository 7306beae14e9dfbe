#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod catalog_service;
pub mod code_runner;
pub mod enrollment_service;
pub mod error;
pub mod quiz_service;

pub use tutor_core::Clock;

pub use account_service::AccountService;
pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use code_runner::{CodeRunnerConfig, CodeRunnerService, Language, RunOutput};
pub use enrollment_service::{CourseOverview, EnrolledCourse, EnrollmentService, OpenedChapter};
pub use error::{
    AccountError, AppServicesError, CatalogServiceError, CodeRunnerError, EnrollmentServiceError,
    QuizServiceError,
};
pub use quiz_service::QuizService;
