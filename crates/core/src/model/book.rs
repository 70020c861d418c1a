use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::{BookId, GenreId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BookError {
    #[error("book title cannot be empty")]
    EmptyTitle,

    #[error("book author cannot be empty")]
    EmptyAuthor,

    #[error("personal rating must be between 1 and 5: {value}")]
    InvalidRating { value: u8 },

    #[error("cover url is not a valid URL: {raw}")]
    InvalidCoverUrl { raw: String },

    #[error("current page ({current_page}) exceeds total pages ({total_pages})")]
    PageBeyondTotal { current_page: u32, total_pages: u32 },

    #[error("inconsistent persisted book state: {0}")]
    InvalidPersistedState(String),
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Reading lifecycle of a book.
///
/// Transitions move forward only (`NotStarted → InProgress → Completed`),
/// driven by page-count comparisons in [`Book::apply_session`]. Nothing
/// reverses `Completed` automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl BookStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::NotStarted => "not_started",
            BookStatus::InProgress => "in_progress",
            BookStatus::Completed => "completed",
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a new book.
///
/// Collects what a catalog form provides, then [`BookDraft::build`] validates
/// everything at once and produces a `Book` in the `NotStarted` state.
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    title: String,
    author: String,
    publication_year: Option<i32>,
    genre_id: Option<GenreId>,
    total_pages: u32,
    cover_url: Option<String>,
    isbn: Option<String>,
    description: Option<String>,
    personal_rating: Option<u8>,
}

impl BookDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// Total page count; 0 means unknown and disables auto-completion.
    #[must_use]
    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = total_pages;
        self
    }

    #[must_use]
    pub fn with_publication_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_genre(mut self, genre_id: GenreId) -> Self {
        self.genre_id = Some(genre_id);
        self
    }

    #[must_use]
    pub fn with_cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    #[must_use]
    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.personal_rating = Some(rating);
        self
    }

    /// Validate the draft and produce a new, not-yet-started book.
    ///
    /// # Errors
    ///
    /// Returns `BookError::EmptyTitle` / `BookError::EmptyAuthor` for blank
    /// required fields, `BookError::InvalidRating` for a rating outside 1..=5,
    /// and `BookError::InvalidCoverUrl` when the cover URL does not parse.
    pub fn build(self, id: BookId, created_at: DateTime<Utc>) -> Result<Book, BookError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(BookError::EmptyTitle);
        }
        let author = self.author.trim().to_owned();
        if author.is_empty() {
            return Err(BookError::EmptyAuthor);
        }

        if let Some(rating) = self.personal_rating {
            validate_rating(rating)?;
        }
        let cover_url = self
            .cover_url
            .map(|raw| validate_cover_url(&raw))
            .transpose()?;

        Ok(Book {
            id,
            title,
            author,
            publication_year: self.publication_year,
            genre_id: self.genre_id,
            total_pages: self.total_pages,
            cover_url,
            isbn: trimmed_opt(self.isbn),
            description: trimmed_opt(self.description),
            status: BookStatus::NotStarted,
            personal_rating: self.personal_rating,
            current_page: 0,
            started_at: None,
            completed_at: None,
            created_at,
            updated_at: created_at,
        })
    }

    /// Merge edited catalog details onto an existing book, preserving its
    /// reading progress and lifecycle timestamps.
    ///
    /// # Errors
    ///
    /// Returns the same field validations as [`BookDraft::build`], plus
    /// `BookError::PageBeyondTotal` when shrinking `total_pages` below the
    /// book's current page.
    pub fn apply_to(self, existing: &Book, now: DateTime<Utc>) -> Result<Book, BookError> {
        let cover_url = self
            .cover_url
            .map(|raw| validate_cover_url(&raw))
            .transpose()?;

        Book::from_persisted(
            existing.id(),
            self.title.trim().to_owned(),
            self.author.trim().to_owned(),
            self.publication_year,
            self.genre_id,
            self.total_pages,
            cover_url,
            trimmed_opt(self.isbn),
            trimmed_opt(self.description),
            existing.status(),
            self.personal_rating,
            existing.current_page(),
            existing.started_at(),
            existing.completed_at(),
            existing.created_at(),
            now,
        )
    }
}

fn validate_rating(rating: u8) -> Result<(), BookError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(BookError::InvalidRating { value: rating })
    }
}

fn validate_cover_url(raw: &str) -> Result<String, BookError> {
    Url::parse(raw)
        .map(|_| raw.to_owned())
        .map_err(|_| BookError::InvalidCoverUrl {
            raw: raw.to_owned(),
        })
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

//
// ─── BOOK ──────────────────────────────────────────────────────────────────────
//

/// A cataloged book together with its reading progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    publication_year: Option<i32>,
    genre_id: Option<GenreId>,
    total_pages: u32,
    cover_url: Option<String>,
    isbn: Option<String>,
    description: Option<String>,
    status: BookStatus,
    personal_rating: Option<u8>,
    current_page: u32,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Book {
    /// Rehydrate a book from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `BookError::PageBeyondTotal` when the stored progress violates
    /// the page invariant, and the same field validations as
    /// [`BookDraft::build`] for rating and cover URL.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: BookId,
        title: String,
        author: String,
        publication_year: Option<i32>,
        genre_id: Option<GenreId>,
        total_pages: u32,
        cover_url: Option<String>,
        isbn: Option<String>,
        description: Option<String>,
        status: BookStatus,
        personal_rating: Option<u8>,
        current_page: u32,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, BookError> {
        if title.trim().is_empty() {
            return Err(BookError::EmptyTitle);
        }
        if author.trim().is_empty() {
            return Err(BookError::EmptyAuthor);
        }
        if total_pages > 0 && current_page > total_pages {
            return Err(BookError::PageBeyondTotal {
                current_page,
                total_pages,
            });
        }
        if let Some(rating) = personal_rating {
            validate_rating(rating)?;
        }
        if let Some(raw) = &cover_url {
            validate_cover_url(raw)?;
        }
        if status == BookStatus::Completed && completed_at.is_none() {
            return Err(BookError::InvalidPersistedState(
                "completed book is missing completed_at".into(),
            ));
        }

        Ok(Self {
            id,
            title,
            author,
            publication_year,
            genre_id,
            total_pages,
            cover_url,
            isbn,
            description,
            status,
            personal_rating,
            current_page,
            started_at,
            completed_at,
            created_at,
            updated_at,
        })
    }

    /// Advance reading progress after a logged session.
    ///
    /// `new_page = current_page + pages_read`. When `total_pages > 0` and the
    /// new page reaches it, the book completes: `current_page` clamps to
    /// `total_pages` (the page invariant must keep holding), status becomes
    /// `Completed`, and `completed_at` is stamped. Otherwise the status is
    /// `InProgress`. Books with `total_pages == 0` never auto-complete.
    ///
    /// The first session also stamps `started_at`. Only the in-memory value
    /// changes; persisting the result is the caller's concern.
    pub fn apply_session(&mut self, pages_read: u32, now: DateTime<Utc>) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }

        let new_page = self.current_page.saturating_add(pages_read);
        if self.total_pages > 0 && new_page >= self.total_pages {
            self.current_page = self.total_pages;
            self.status = BookStatus::Completed;
            self.completed_at = Some(now);
        } else {
            self.current_page = new_page;
            self.status = BookStatus::InProgress;
        }
        self.updated_at = now;
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> BookId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub fn publication_year(&self) -> Option<i32> {
        self.publication_year
    }

    #[must_use]
    pub fn genre_id(&self) -> Option<GenreId> {
        self.genre_id
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }

    #[must_use]
    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> BookStatus {
        self.status
    }

    #[must_use]
    pub fn personal_rating(&self) -> Option<u8> {
        self.personal_rating
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Completion fraction in percent, rounded; `None` when total pages are
    /// unknown.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> Option<u32> {
        if self.total_pages == 0 {
            return None;
        }
        let ratio = f64::from(self.current_page) / f64::from(self.total_pages);
        Some((ratio * 100.0).round() as u32)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn build_book(current_page: u32, total_pages: u32) -> Book {
        let mut book = BookDraft::new("The Name of the Wind", "Patrick Rothfuss")
            .with_total_pages(total_pages)
            .build(BookId::new(1), fixed_now())
            .unwrap();
        if current_page > 0 {
            book.apply_session(current_page, fixed_now());
        }
        book
    }

    #[test]
    fn draft_rejects_empty_title() {
        let err = BookDraft::new("   ", "Someone")
            .build(BookId::new(1), fixed_now())
            .unwrap_err();
        assert_eq!(err, BookError::EmptyTitle);
    }

    #[test]
    fn draft_rejects_empty_author() {
        let err = BookDraft::new("A Title", "")
            .build(BookId::new(1), fixed_now())
            .unwrap_err();
        assert_eq!(err, BookError::EmptyAuthor);
    }

    #[test]
    fn draft_rejects_out_of_range_rating() {
        let err = BookDraft::new("A Title", "Someone")
            .with_rating(6)
            .build(BookId::new(1), fixed_now())
            .unwrap_err();
        assert_eq!(err, BookError::InvalidRating { value: 6 });
    }

    #[test]
    fn draft_rejects_malformed_cover_url() {
        let err = BookDraft::new("A Title", "Someone")
            .with_cover_url("not a url")
            .build(BookId::new(1), fixed_now())
            .unwrap_err();
        assert!(matches!(err, BookError::InvalidCoverUrl { .. }));
    }

    #[test]
    fn draft_trims_fields_and_filters_blank_optionals() {
        let book = BookDraft::new("  Dune  ", " Frank Herbert ")
            .with_description("   ")
            .with_isbn(" 9780441013593 ")
            .build(BookId::new(2), fixed_now())
            .unwrap();

        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
        assert_eq!(book.description(), None);
        assert_eq!(book.isbn(), Some("9780441013593"));
        assert_eq!(book.status(), BookStatus::NotStarted);
        assert_eq!(book.current_page(), 0);
    }

    #[test]
    fn apply_session_reaching_total_completes() {
        let mut book = build_book(90, 100);
        book.apply_session(10, fixed_now());

        assert_eq!(book.current_page(), 100);
        assert_eq!(book.status(), BookStatus::Completed);
        assert_eq!(book.completed_at(), Some(fixed_now()));
    }

    #[test]
    fn apply_session_short_of_total_stays_in_progress() {
        let mut book = build_book(90, 100);
        book.apply_session(5, fixed_now());

        assert_eq!(book.current_page(), 95);
        assert_eq!(book.status(), BookStatus::InProgress);
        assert_eq!(book.completed_at(), None);
    }

    #[test]
    fn apply_session_clamps_overshoot_to_total() {
        let mut book = build_book(90, 100);
        book.apply_session(37, fixed_now());

        assert_eq!(book.current_page(), 100);
        assert_eq!(book.status(), BookStatus::Completed);
    }

    #[test]
    fn apply_session_never_completes_without_total_pages() {
        let mut book = build_book(0, 0);
        book.apply_session(500, fixed_now());

        assert_eq!(book.current_page(), 500);
        assert_eq!(book.status(), BookStatus::InProgress);
        assert_eq!(book.completed_at(), None);
    }

    #[test]
    fn first_session_stamps_started_at_once() {
        let mut book = build_book(0, 200);
        let first = fixed_now();
        book.apply_session(10, first);
        assert_eq!(book.started_at(), Some(first));

        let later = first + chrono::Duration::days(1);
        book.apply_session(10, later);
        assert_eq!(book.started_at(), Some(first));
        assert_eq!(book.updated_at(), later);
    }

    #[test]
    fn from_persisted_rejects_page_beyond_total() {
        let err = Book::from_persisted(
            BookId::new(1),
            "Title".into(),
            "Author".into(),
            None,
            None,
            100,
            None,
            None,
            None,
            BookStatus::InProgress,
            None,
            150,
            Some(fixed_now()),
            None,
            fixed_now(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BookError::PageBeyondTotal {
                current_page: 150,
                total_pages: 100
            }
        );
    }

    #[test]
    fn from_persisted_rejects_completed_without_timestamp() {
        let err = Book::from_persisted(
            BookId::new(1),
            "Title".into(),
            "Author".into(),
            None,
            None,
            100,
            None,
            None,
            None,
            BookStatus::Completed,
            None,
            100,
            Some(fixed_now()),
            None,
            fixed_now(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, BookError::InvalidPersistedState(_)));
    }

    #[test]
    fn apply_to_preserves_progress_while_editing_details() {
        let mut book = build_book(0, 200);
        book.apply_session(80, fixed_now());

        let later = fixed_now() + chrono::Duration::days(2);
        let updated = BookDraft::new("The Name of the Wind", "Patrick Rothfuss")
            .with_total_pages(200)
            .with_rating(4)
            .apply_to(&book, later)
            .unwrap();

        assert_eq!(updated.current_page(), 80);
        assert_eq!(updated.status(), BookStatus::InProgress);
        assert_eq!(updated.started_at(), book.started_at());
        assert_eq!(updated.created_at(), book.created_at());
        assert_eq!(updated.personal_rating(), Some(4));
        assert_eq!(updated.updated_at(), later);
    }

    #[test]
    fn apply_to_rejects_total_below_current_page() {
        let mut book = build_book(0, 200);
        book.apply_session(80, fixed_now());

        let err = BookDraft::new("Renamed", "Someone")
            .with_total_pages(50)
            .apply_to(&book, fixed_now())
            .unwrap_err();
        assert_eq!(
            err,
            BookError::PageBeyondTotal {
                current_page: 80,
                total_pages: 50
            }
        );
    }

    #[test]
    fn progress_percent_rounds_and_handles_unknown_total() {
        let book = build_book(33, 100);
        assert_eq!(book.progress_percent(), Some(33));
        let unknown = build_book(0, 0);
        assert_eq!(unknown.progress_percent(), None);
    }
}
