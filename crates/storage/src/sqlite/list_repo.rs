use chrono::Utc;
use reading_core::model::{BookId, ListId, ReadingList};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{book_id_from_i64, id_to_i64, list_id_from_i64, map_list_row, ser},
};
use crate::repository::{ListRepository, NewListRecord, StorageError};

#[async_trait::async_trait]
impl ListRepository for SqliteRepository {
    async fn insert_new_list(&self, record: NewListRecord) -> Result<ListId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO reading_lists (name, description, color, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&record.name)
        .bind(&record.description)
        .bind(&record.color)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        list_id_from_i64(result.last_insert_rowid())
    }

    async fn list_reading_lists(&self) -> Result<Vec<ReadingList>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, color, created_at
            FROM reading_lists
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_list_row).collect()
    }

    async fn delete_list(&self, id: ListId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM reading_lists WHERE id = ?1")
            .bind(id_to_i64("list_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn add_book_to_list(
        &self,
        list_id: ListId,
        book_id: BookId,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO list_books (list_id, book_id, added_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(id_to_i64("list_id", list_id.value())?)
        .bind(id_to_i64("book_id", book_id.value())?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StorageError::Conflict)
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(StorageError::NotFound)
            }
            Err(e) => Err(StorageError::Connection(e.to_string())),
        }
    }

    async fn remove_book_from_list(
        &self,
        list_id: ListId,
        book_id: BookId,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM list_books WHERE list_id = ?1 AND book_id = ?2")
            .bind(id_to_i64("list_id", list_id.value())?)
            .bind(id_to_i64("book_id", book_id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn books_in_list(&self, list_id: ListId) -> Result<Vec<BookId>, StorageError> {
        let exists = sqlx::query("SELECT 1 FROM reading_lists WHERE id = ?1")
            .bind(id_to_i64("list_id", list_id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let rows = sqlx::query(
            r"
            SELECT book_id FROM list_books
            WHERE list_id = ?1
            ORDER BY added_at ASC, book_id ASC
            ",
        )
        .bind(id_to_i64("list_id", list_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter()
            .map(|row| book_id_from_i64(row.try_get::<i64, _>("book_id").map_err(ser)?))
            .collect()
    }
}
