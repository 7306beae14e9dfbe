#![forbid(unsafe_code)]

mod documents;
pub mod repository;
pub mod sqlite;

pub use repository::{
    CatalogRepository, EnrollmentRepository, InMemoryRepository, QuizRepository, Storage,
    StorageError, UserRepository,
};
