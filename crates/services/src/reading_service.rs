use std::sync::Arc;

use reading_core::Clock;
use reading_core::model::{Book, BookId, ReadingSession, SessionId};
use storage::repository::{BookRepository, NewSessionRecord, SessionRepository, StorageError};
use tracing::info;

use crate::error::ReadingServiceError;

/// Outcome of logging a session: the allocated id plus the book as persisted.
#[derive(Debug, Clone)]
pub struct LoggedReading {
    pub session_id: SessionId,
    pub book: Book,
}

/// A book's full session history with lifetime totals.
#[derive(Debug, Clone)]
pub struct BookHistory {
    pub sessions: Vec<ReadingSession>,
    pub total_pages_read: u32,
    pub total_minutes: u32,
}

/// The log-a-session workflow.
///
/// Reads the book, advances its progress through the domain rules, and hands
/// both writes to the repository's atomic `log_reading` — the session insert
/// and the book update land together or not at all.
#[derive(Clone)]
pub struct ReadingService {
    clock: Clock,
    books: Arc<dyn BookRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl ReadingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        books: Arc<dyn BookRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            clock,
            books,
            sessions,
        }
    }

    /// Log a reading session against a book, dated today.
    ///
    /// # Errors
    ///
    /// Returns `ReadingServiceError::Storage` when the book does not exist or
    /// persistence fails; no partial write remains in that case.
    pub async fn log_reading(
        &self,
        book_id: BookId,
        pages_read: u32,
        duration_minutes: u32,
        notes: Option<String>,
    ) -> Result<LoggedReading, ReadingServiceError> {
        let now = self.clock.now();
        let mut book = self
            .books
            .get_book(book_id)
            .await?
            .ok_or(StorageError::NotFound)?;

        let start_page = book.current_page();
        book.apply_session(pages_read, now);

        let record = NewSessionRecord {
            book_id,
            session_date: now.date_naive(),
            pages_read,
            start_page: Some(start_page),
            end_page: Some(book.current_page()),
            duration_minutes,
            notes: notes
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
            created_at: now,
        };

        let session_id = self.sessions.log_reading(record, &book).await?;
        info!(
            book_id = %book_id,
            session_id = %session_id,
            pages_read,
            status = book.status().as_str(),
            "logged reading session"
        );

        Ok(LoggedReading { session_id, book })
    }

    /// Most recent sessions across all books.
    ///
    /// # Errors
    ///
    /// Returns `ReadingServiceError::Storage` if repository access fails.
    pub async fn recent_sessions(
        &self,
        limit: u32,
    ) -> Result<Vec<ReadingSession>, ReadingServiceError> {
        let sessions = self.sessions.list_sessions(limit).await?;
        Ok(sessions)
    }

    /// All sessions for a book, newest first, with lifetime totals.
    ///
    /// # Errors
    ///
    /// Returns `ReadingServiceError::Storage` if repository access fails.
    pub async fn book_history(&self, book_id: BookId) -> Result<BookHistory, ReadingServiceError> {
        let sessions = self.sessions.sessions_for_book(book_id).await?;
        let total_pages_read = sessions
            .iter()
            .fold(0_u32, |sum, s| sum.saturating_add(s.pages_read()));
        let total_minutes = sessions
            .iter()
            .fold(0_u32, |sum, s| sum.saturating_add(s.duration_minutes()));

        Ok(BookHistory {
            sessions,
            total_pages_read,
            total_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reading_core::model::{BookDraft, BookStatus};
    use reading_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, NewBookRecord};

    async fn seeded() -> (ReadingService, BookId) {
        let repo = InMemoryRepository::new();
        let book = BookDraft::new("Kindred", "Octavia E. Butler")
            .with_total_pages(100)
            .build(BookId::new(1), fixed_now())
            .unwrap();
        let id = repo
            .insert_new_book(NewBookRecord::from_book(&book))
            .await
            .unwrap();

        let repo = Arc::new(repo);
        let service = ReadingService::new(fixed_clock(), repo.clone(), repo);
        (service, id)
    }

    #[tokio::test]
    async fn logging_advances_the_book_and_records_the_span() {
        let (service, id) = seeded().await;

        let logged = service.log_reading(id, 40, 30, None).await.unwrap();
        assert_eq!(logged.book.current_page(), 40);
        assert_eq!(logged.book.status(), BookStatus::InProgress);

        let history = service.book_history(id).await.unwrap();
        assert_eq!(history.sessions.len(), 1);
        assert_eq!(history.sessions[0].start_page(), Some(0));
        assert_eq!(history.sessions[0].end_page(), Some(40));
        assert_eq!(history.total_pages_read, 40);
        assert_eq!(history.total_minutes, 30);
    }

    #[tokio::test]
    async fn logging_to_the_final_page_completes_the_book() {
        let (service, id) = seeded().await;

        service.log_reading(id, 90, 60, None).await.unwrap();
        let logged = service.log_reading(id, 10, 15, Some("done!".into())).await.unwrap();

        assert_eq!(logged.book.status(), BookStatus::Completed);
        assert_eq!(logged.book.current_page(), 100);
        assert_eq!(logged.book.completed_at(), Some(fixed_now()));

        let history = service.book_history(id).await.unwrap();
        assert_eq!(history.sessions.len(), 2);
        assert_eq!(history.sessions[0].notes(), Some("done!"));
    }

    #[tokio::test]
    async fn logging_against_a_missing_book_fails_cleanly() {
        let (service, _) = seeded().await;
        let err = service
            .log_reading(BookId::new(99), 10, 10, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReadingServiceError::Storage(StorageError::NotFound)
        ));
        assert!(service.recent_sessions(10).await.unwrap().is_empty());
    }
}
