use chrono::NaiveDate;
use reading_core::model::{Book, BookId, ReadingSession, SessionId};

use super::{
    SqliteRepository,
    mapping::{id_to_i64, map_session_row, session_id_from_i64, status_to_str},
};
use crate::repository::{NewSessionRecord, SessionRepository, StorageError};

const SESSION_COLUMNS: &str = r"
    id, book_id, session_date, pages_read, start_page, end_page,
    duration_minutes, notes, created_at
";

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn log_reading(
        &self,
        record: NewSessionRecord,
        book: &Book,
    ) -> Result<SessionId, StorageError> {
        // One transaction for both writes: the session row and the book's
        // advanced progress commit together or not at all.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let inserted = sqlx::query(
            r"
            INSERT INTO reading_sessions (
                book_id, session_date, pages_read, start_page, end_page,
                duration_minutes, notes, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(id_to_i64("book_id", record.book_id.value())?)
        .bind(record.session_date)
        .bind(i64::from(record.pages_read))
        .bind(record.start_page.map(i64::from))
        .bind(record.end_page.map(i64::from))
        .bind(i64::from(record.duration_minutes))
        .bind(&record.notes)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let updated = sqlx::query(
            r"
            UPDATE books SET
                status = ?2,
                current_page = ?3,
                started_at = ?4,
                completed_at = ?5,
                updated_at = ?6
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("book_id", book.id().value())?)
        .bind(status_to_str(book.status()))
        .bind(i64::from(book.current_page()))
        .bind(book.started_at())
        .bind(book.completed_at())
        .bind(book.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if updated.rows_affected() == 0 {
            // Rolls back the session insert on drop.
            return Err(StorageError::NotFound);
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        session_id_from_i64(inserted.last_insert_rowid())
    }

    async fn list_sessions(&self, limit: u32) -> Result<Vec<ReadingSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM reading_sessions
             ORDER BY session_date DESC, id DESC LIMIT ?1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_session_row).collect()
    }

    async fn sessions_for_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReadingSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM reading_sessions
             WHERE book_id = ?1
             ORDER BY session_date DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(id_to_i64("book_id", book_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_session_row).collect()
    }

    async fn sessions_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReadingSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM reading_sessions
             WHERE session_date >= ?1 AND session_date <= ?2
             ORDER BY session_date ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_session_row).collect()
    }
}
