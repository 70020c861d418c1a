use std::sync::Arc;

use reading_core::Clock;
use reading_core::model::{Genre, GenreId};
use storage::repository::{GenreRepository, NewGenreRecord};
use tracing::info;

use crate::error::GenreServiceError;

/// Genre shelf management.
#[derive(Clone)]
pub struct GenreService {
    clock: Clock,
    genres: Arc<dyn GenreRepository>,
}

impl GenreService {
    #[must_use]
    pub fn new(clock: Clock, genres: Arc<dyn GenreRepository>) -> Self {
        Self { clock, genres }
    }

    /// Create a user-defined genre.
    ///
    /// # Errors
    ///
    /// Returns `GenreServiceError::Genre` for validation failures.
    /// Returns `GenreServiceError::Storage` if persistence fails.
    pub async fn create_genre(
        &self,
        name: String,
        color: String,
    ) -> Result<GenreId, GenreServiceError> {
        let genre = Genre::new(GenreId::new(1), name, color, false, self.clock.now())?;
        let genre_id = self
            .genres
            .insert_new_genre(NewGenreRecord::from_genre(&genre))
            .await?;
        info!(genre_id = %genre_id, name = genre.name(), "created genre");
        Ok(genre_id)
    }

    /// All genres, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `GenreServiceError::Storage` if repository access fails.
    pub async fn list_genres(&self) -> Result<Vec<Genre>, GenreServiceError> {
        let genres = self.genres.list_genres().await?;
        Ok(genres)
    }

    /// Rename or recolor a genre, keeping its default flag.
    ///
    /// # Errors
    ///
    /// Returns `GenreServiceError::Genre` if validation fails.
    /// Returns `GenreServiceError::Storage` if the genre does not exist.
    pub async fn update_genre(
        &self,
        genre_id: GenreId,
        name: String,
        color: String,
    ) -> Result<(), GenreServiceError> {
        let existing = self
            .genres
            .list_genres()
            .await?
            .into_iter()
            .find(|g| g.id() == genre_id)
            .ok_or(storage::repository::StorageError::NotFound)?;

        let updated = Genre::new(
            genre_id,
            name,
            color,
            existing.is_default(),
            existing.created_at(),
        )?;
        self.genres.update_genre(&updated).await?;
        Ok(())
    }

    /// Delete a genre. Books shelved under it keep existing with no genre.
    ///
    /// # Errors
    ///
    /// Returns `GenreServiceError::Storage` if the genre does not exist.
    pub async fn delete_genre(&self, genre_id: GenreId) -> Result<(), GenreServiceError> {
        self.genres.delete_genre(genre_id).await?;
        info!(genre_id = %genre_id, "deleted genre");
        Ok(())
    }
}
