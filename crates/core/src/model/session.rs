use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::model::ids::{BookId, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("page span end ({end_page}) is before start ({start_page})")]
    InvalidPageSpan { start_page: u32, end_page: u32 },
}

/// One logged instance of reading a book.
///
/// Sessions are append-only: once recorded there is no update path. The date
/// is a calendar day with no time component — streaks and heatmap buckets key
/// on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingSession {
    id: SessionId,
    book_id: BookId,
    session_date: NaiveDate,
    pages_read: u32,
    start_page: Option<u32>,
    end_page: Option<u32>,
    duration_minutes: u32,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl ReadingSession {
    #[must_use]
    pub fn new(
        id: SessionId,
        book_id: BookId,
        session_date: NaiveDate,
        pages_read: u32,
        duration_minutes: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            book_id,
            session_date,
            pages_read,
            start_page: None,
            end_page: None,
            duration_minutes,
            notes: None,
            created_at,
        }
    }

    /// Attach the page span the session covered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPageSpan` when `end_page < start_page`.
    pub fn with_page_span(mut self, start_page: u32, end_page: u32) -> Result<Self, SessionError> {
        if end_page < start_page {
            return Err(SessionError::InvalidPageSpan {
                start_page,
                end_page,
            });
        }
        self.start_page = Some(start_page);
        self.end_page = Some(end_page);
        Ok(self)
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        let trimmed = notes.trim();
        self.notes = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        };
        self
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPageSpan` when a stored span is inverted.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        book_id: BookId,
        session_date: NaiveDate,
        pages_read: u32,
        start_page: Option<u32>,
        end_page: Option<u32>,
        duration_minutes: u32,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if let (Some(start), Some(end)) = (start_page, end_page) {
            if end < start {
                return Err(SessionError::InvalidPageSpan {
                    start_page: start,
                    end_page: end,
                });
            }
        }

        Ok(Self {
            id,
            book_id,
            session_date,
            pages_read,
            start_page,
            end_page,
            duration_minutes,
            notes,
            created_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    #[must_use]
    pub fn session_date(&self) -> NaiveDate {
        self.session_date
    }

    #[must_use]
    pub fn pages_read(&self) -> u32 {
        self.pages_read
    }

    #[must_use]
    pub fn start_page(&self) -> Option<u32> {
        self.start_page
    }

    #[must_use]
    pub fn end_page(&self) -> Option<u32> {
        self.end_page
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{fixed_now, fixed_today};

    #[test]
    fn session_carries_page_span() {
        let session = ReadingSession::new(
            SessionId::new(1),
            BookId::new(1),
            fixed_today(),
            30,
            45,
            fixed_now(),
        )
        .with_page_span(100, 130)
        .unwrap();

        assert_eq!(session.start_page(), Some(100));
        assert_eq!(session.end_page(), Some(130));
        assert_eq!(session.pages_read(), 30);
    }

    #[test]
    fn inverted_page_span_is_rejected() {
        let err = ReadingSession::new(
            SessionId::new(1),
            BookId::new(1),
            fixed_today(),
            30,
            45,
            fixed_now(),
        )
        .with_page_span(130, 100)
        .unwrap_err();

        assert_eq!(
            err,
            SessionError::InvalidPageSpan {
                start_page: 130,
                end_page: 100
            }
        );
    }

    #[test]
    fn blank_notes_are_dropped() {
        let session = ReadingSession::new(
            SessionId::new(1),
            BookId::new(1),
            fixed_today(),
            10,
            15,
            fixed_now(),
        )
        .with_notes("   ");
        assert_eq!(session.notes(), None);

        let session = session.with_notes("  great chapter ");
        assert_eq!(session.notes(), Some("great chapter"));
    }
}
