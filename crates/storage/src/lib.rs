#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    BookRepository, GenreRepository, GoalRepository, InMemoryRepository, ListRepository,
    NewBookRecord, NewGenreRecord, NewGoalRecord, NewListRecord, NewSessionRecord,
    SessionRepository, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
