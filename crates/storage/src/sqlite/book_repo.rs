use reading_core::model::{Book, BookId, BookStatus};

use super::{
    SqliteRepository,
    mapping::{book_id_from_i64, id_to_i64, map_book_row, status_to_str},
};
use crate::repository::{BookRepository, NewBookRecord, StorageError};

const BOOK_COLUMNS: &str = r"
    id, title, author, publication_year, genre_id, total_pages, cover_url,
    isbn, description, status, personal_rating, current_page, started_at,
    completed_at, created_at, updated_at
";

#[async_trait::async_trait]
impl BookRepository for SqliteRepository {
    async fn insert_new_book(&self, record: NewBookRecord) -> Result<BookId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO books (
                title, author, publication_year, genre_id, total_pages, cover_url,
                isbn, description, status, personal_rating, current_page,
                started_at, completed_at, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, NULL, NULL, ?11, ?11)
            ",
        )
        .bind(&record.title)
        .bind(&record.author)
        .bind(record.publication_year)
        .bind(
            record
                .genre_id
                .map(|g| id_to_i64("genre_id", g.value()))
                .transpose()?,
        )
        .bind(i64::from(record.total_pages))
        .bind(&record.cover_url)
        .bind(&record.isbn)
        .bind(&record.description)
        .bind(status_to_str(BookStatus::NotStarted))
        .bind(record.personal_rating.map(i64::from))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        book_id_from_i64(result.last_insert_rowid())
    }

    async fn update_book(&self, book: &Book) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE books SET
                title = ?2,
                author = ?3,
                publication_year = ?4,
                genre_id = ?5,
                total_pages = ?6,
                cover_url = ?7,
                isbn = ?8,
                description = ?9,
                status = ?10,
                personal_rating = ?11,
                current_page = ?12,
                started_at = ?13,
                completed_at = ?14,
                updated_at = ?15
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("book_id", book.id().value())?)
        .bind(book.title())
        .bind(book.author())
        .bind(book.publication_year())
        .bind(
            book.genre_id()
                .map(|g| id_to_i64("genre_id", g.value()))
                .transpose()?,
        )
        .bind(i64::from(book.total_pages()))
        .bind(book.cover_url())
        .bind(book.isbn())
        .bind(book.description())
        .bind(status_to_str(book.status()))
        .bind(book.personal_rating().map(i64::from))
        .bind(i64::from(book.current_page()))
        .bind(book.started_at())
        .bind(book.completed_at())
        .bind(book.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64("book_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_book_row).transpose()
    }

    async fn list_books(&self, limit: u32) -> Result<Vec<Book>, StorageError> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC, id DESC LIMIT ?1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_book_row).collect()
    }

    async fn recently_updated(&self, limit: u32) -> Result<Vec<Book>, StorageError> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY updated_at DESC, id DESC LIMIT ?1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_book_row).collect()
    }

    async fn delete_book(&self, id: BookId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id_to_i64("book_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
