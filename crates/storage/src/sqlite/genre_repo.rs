use reading_core::model::{Genre, GenreId};

use super::{
    SqliteRepository,
    mapping::{genre_id_from_i64, id_to_i64, map_genre_row},
};
use crate::repository::{GenreRepository, NewGenreRecord, StorageError};

#[async_trait::async_trait]
impl GenreRepository for SqliteRepository {
    async fn insert_new_genre(&self, record: NewGenreRecord) -> Result<GenreId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO genres (name, color, is_default, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&record.name)
        .bind(&record.color)
        .bind(i64::from(record.is_default))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        genre_id_from_i64(result.last_insert_rowid())
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, color, is_default, created_at
            FROM genres
            ORDER BY name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_genre_row).collect()
    }

    async fn update_genre(&self, genre: &Genre) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE genres SET name = ?2, color = ?3, is_default = ?4
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("genre_id", genre.id().value())?)
        .bind(genre.name())
        .bind(genre.color())
        .bind(i64::from(genre.is_default()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_genre(&self, id: GenreId) -> Result<(), StorageError> {
        // ON DELETE SET NULL unshelves books under this genre.
        let result = sqlx::query("DELETE FROM genres WHERE id = ?1")
            .bind(id_to_i64("genre_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
