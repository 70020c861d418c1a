//! Shared error types for the services crate.

use thiserror::Error;

use reading_core::model::{BookError, GenreError, GoalError, ListError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `BookService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BookServiceError {
    #[error(transparent)]
    Book(#[from] BookError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ReadingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadingServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GoalService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GoalServiceError {
    #[error(transparent)]
    Goal(#[from] GoalError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GenreService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenreServiceError {
    #[error(transparent)]
    Genre(#[from] GenreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ListService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ListServiceError {
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsServiceError {
    #[error("invalid calendar month: {month}")]
    InvalidMonth { month: u32 },
    #[error("year out of range: {year}")]
    InvalidYear { year: i32 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Genre(#[from] GenreError),
}
