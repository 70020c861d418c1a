use std::sync::Arc;

use reading_core::Clock;
use reading_core::model::{Book, BookDraft, BookId};
use storage::repository::{BookRepository, NewBookRecord};
use tracing::info;

use crate::error::BookServiceError;

/// Orchestrates catalog management for books.
#[derive(Clone)]
pub struct BookService {
    clock: Clock,
    books: Arc<dyn BookRepository>,
}

impl BookService {
    #[must_use]
    pub fn new(clock: Clock, books: Arc<dyn BookRepository>) -> Self {
        Self { clock, books }
    }

    /// Validate a draft and add the book to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::Book` for validation failures.
    /// Returns `BookServiceError::Storage` if persistence fails.
    pub async fn add_book(&self, draft: BookDraft) -> Result<BookId, BookServiceError> {
        let now = self.clock.now();
        let book = draft.build(BookId::new(1), now)?;
        let book_id = self
            .books
            .insert_new_book(NewBookRecord::from_book(&book))
            .await?;
        info!(book_id = %book_id, title = book.title(), "added book");
        Ok(book_id)
    }

    /// Fetch a book by id.
    ///
    /// Returns `Ok(None)` when the book does not exist.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::Storage` if repository access fails.
    pub async fn get_book(&self, book_id: BookId) -> Result<Option<Book>, BookServiceError> {
        let book = self.books.get_book(book_id).await?;
        Ok(book)
    }

    /// List books, newest first, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::Storage` if repository access fails.
    pub async fn list_books(&self, limit: u32) -> Result<Vec<Book>, BookServiceError> {
        let books = self.books.list_books(limit).await?;
        Ok(books)
    }

    /// Replace a book's catalog details while preserving reading progress.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::Book` if validation fails (including
    /// shrinking total pages below the current page).
    /// Returns `BookServiceError::Storage` if repository access fails.
    pub async fn update_details(
        &self,
        book_id: BookId,
        draft: BookDraft,
    ) -> Result<(), BookServiceError> {
        let book = self
            .books
            .get_book(book_id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;

        let updated = draft.apply_to(&book, self.clock.now())?;
        self.books.update_book(&updated).await?;
        Ok(())
    }

    /// Remove a book and everything hanging off it (sessions, memberships).
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::Storage` if the book does not exist or
    /// repository access fails.
    pub async fn delete_book(&self, book_id: BookId) -> Result<(), BookServiceError> {
        self.books.delete_book(book_id).await?;
        info!(book_id = %book_id, "deleted book");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reading_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> BookService {
        BookService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn add_and_fetch_roundtrip() {
        let service = service();
        let id = service
            .add_book(BookDraft::new("Piranesi", "Susanna Clarke").with_total_pages(245))
            .await
            .unwrap();

        let book = service.get_book(id).await.unwrap().unwrap();
        assert_eq!(book.title(), "Piranesi");
        assert_eq!(book.total_pages(), 245);
    }

    #[tokio::test]
    async fn add_book_surfaces_validation_errors() {
        let service = service();
        let err = service.add_book(BookDraft::new("", "Nobody")).await.unwrap_err();
        assert!(matches!(err, BookServiceError::Book(_)));
    }

    #[tokio::test]
    async fn update_details_keeps_progress() {
        let service = service();
        let id = service
            .add_book(BookDraft::new("Piranesi", "S. Clarke").with_total_pages(245))
            .await
            .unwrap();

        service
            .update_details(
                id,
                BookDraft::new("Piranesi", "Susanna Clarke")
                    .with_total_pages(245)
                    .with_rating(5),
            )
            .await
            .unwrap();

        let book = service.get_book(id).await.unwrap().unwrap();
        assert_eq!(book.author(), "Susanna Clarke");
        assert_eq!(book.personal_rating(), Some(5));
        assert_eq!(book.current_page(), 0);
    }

    #[tokio::test]
    async fn update_details_of_missing_book_is_not_found() {
        let service = service();
        let err = service
            .update_details(BookId::new(99), BookDraft::new("X", "Y"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookServiceError::Storage(storage::repository::StorageError::NotFound)
        ));
    }
}
