use std::sync::Arc;

use reading_core::Clock;
use reading_core::model::{Book, BookId, ListId, ReadingList};
use storage::repository::{BookRepository, ListRepository, NewListRecord};
use tracing::info;

use crate::error::ListServiceError;

/// Custom reading-list management and membership.
#[derive(Clone)]
pub struct ListService {
    clock: Clock,
    lists: Arc<dyn ListRepository>,
    books: Arc<dyn BookRepository>,
}

impl ListService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lists: Arc<dyn ListRepository>,
        books: Arc<dyn BookRepository>,
    ) -> Self {
        Self {
            clock,
            lists,
            books,
        }
    }

    /// Create a reading list.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::List` for validation failures.
    /// Returns `ListServiceError::Storage` if persistence fails.
    pub async fn create_list(
        &self,
        name: String,
        description: Option<String>,
        color: String,
    ) -> Result<ListId, ListServiceError> {
        let list = ReadingList::new(ListId::new(1), name, description, color, self.clock.now())?;
        let list_id = self
            .lists
            .insert_new_list(NewListRecord::from_list(&list))
            .await?;
        info!(list_id = %list_id, name = list.name(), "created reading list");
        Ok(list_id)
    }

    /// All reading lists, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::Storage` if repository access fails.
    pub async fn lists(&self) -> Result<Vec<ReadingList>, ListServiceError> {
        let lists = self.lists.list_reading_lists().await?;
        Ok(lists)
    }

    /// Delete a list and its memberships; the books survive.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::Storage` if the list does not exist.
    pub async fn delete_list(&self, list_id: ListId) -> Result<(), ListServiceError> {
        self.lists.delete_list(list_id).await?;
        Ok(())
    }

    /// Add a book to a list.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::Storage` with `Conflict` when the book is
    /// already on the list, or `NotFound` when either side is missing.
    pub async fn add_book(&self, list_id: ListId, book_id: BookId) -> Result<(), ListServiceError> {
        self.lists.add_book_to_list(list_id, book_id).await?;
        Ok(())
    }

    /// Remove a book from a list.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::Storage` when the membership does not exist.
    pub async fn remove_book(
        &self,
        list_id: ListId,
        book_id: BookId,
    ) -> Result<(), ListServiceError> {
        self.lists.remove_book_from_list(list_id, book_id).await?;
        Ok(())
    }

    /// Resolve the books on a list, in the order they were added.
    ///
    /// Memberships pointing at since-deleted books are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ListServiceError::Storage` when the list does not exist.
    pub async fn books_in_list(&self, list_id: ListId) -> Result<Vec<Book>, ListServiceError> {
        let ids = self.lists.books_in_list(list_id).await?;
        let mut books = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(book) = self.books.get_book(id).await? {
                books.push(book);
            }
        }
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reading_core::model::BookDraft;
    use reading_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, NewBookRecord, StorageError};

    async fn seeded() -> (ListService, BookId) {
        let repo = Arc::new(InMemoryRepository::new());
        let book = BookDraft::new("Convenience Store Woman", "Sayaka Murata")
            .with_total_pages(163)
            .build(BookId::new(1), fixed_now())
            .unwrap();
        let id = repo
            .insert_new_book(NewBookRecord::from_book(&book))
            .await
            .unwrap();
        let service = ListService::new(fixed_clock(), repo.clone(), repo);
        (service, id)
    }

    #[tokio::test]
    async fn membership_flow_resolves_books() {
        let (service, book_id) = seeded().await;
        let list_id = service
            .create_list("Favorites".into(), None, "#8b5cf6".into())
            .await
            .unwrap();

        service.add_book(list_id, book_id).await.unwrap();
        let books = service.books_in_list(list_id).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title(), "Convenience Store Woman");

        service.remove_book(list_id, book_id).await.unwrap();
        assert!(service.books_in_list(list_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn double_add_surfaces_conflict() {
        let (service, book_id) = seeded().await;
        let list_id = service
            .create_list("Loans".into(), None, "#10b981".into())
            .await
            .unwrap();

        service.add_book(list_id, book_id).await.unwrap();
        let err = service.add_book(list_id, book_id).await.unwrap_err();
        assert!(matches!(
            err,
            ListServiceError::Storage(StorageError::Conflict)
        ));
    }
}
