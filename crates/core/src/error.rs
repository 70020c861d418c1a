use thiserror::Error;

use crate::model::{BookError, GenreError, GoalError, ListError, SessionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Book(#[from] BookError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Goal(#[from] GoalError),
    #[error(transparent)]
    Genre(#[from] GenreError),
    #[error(transparent)]
    List(#[from] ListError),
}
