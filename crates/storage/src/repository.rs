use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reading_core::model::{
    Book, BookId, Genre, GenreId, Goal, GoalId, GoalType, ListId, ReadingList, ReadingSession,
    SessionId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── NEW-ROW RECORDS ───────────────────────────────────────────────────────────
//

/// Insert shape for a book; the repository allocates the id.
#[derive(Debug, Clone)]
pub struct NewBookRecord {
    pub title: String,
    pub author: String,
    pub publication_year: Option<i32>,
    pub genre_id: Option<GenreId>,
    pub total_pages: u32,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub personal_rating: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl NewBookRecord {
    /// Capture the insertable fields of a freshly built book. The book's own
    /// id is a placeholder until the repository hands back the real one.
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title().to_owned(),
            author: book.author().to_owned(),
            publication_year: book.publication_year(),
            genre_id: book.genre_id(),
            total_pages: book.total_pages(),
            cover_url: book.cover_url().map(str::to_owned),
            isbn: book.isbn().map(str::to_owned),
            description: book.description().map(str::to_owned),
            personal_rating: book.personal_rating(),
            created_at: book.created_at(),
        }
    }
}

/// Insert shape for a reading session.
#[derive(Debug, Clone)]
pub struct NewSessionRecord {
    pub book_id: BookId,
    pub session_date: NaiveDate,
    pub pages_read: u32,
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub duration_minutes: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a goal; the repository allocates the id.
#[derive(Debug, Clone)]
pub struct NewGoalRecord {
    pub goal_type: GoalType,
    pub target_value: u32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl NewGoalRecord {
    #[must_use]
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            goal_type: goal.goal_type(),
            target_value: goal.target_value(),
            period_start: goal.period_start(),
            period_end: goal.period_end(),
            is_active: goal.is_active(),
            created_at: goal.created_at(),
        }
    }
}

/// Insert shape for a genre; the repository allocates the id.
#[derive(Debug, Clone)]
pub struct NewGenreRecord {
    pub name: String,
    pub color: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl NewGenreRecord {
    #[must_use]
    pub fn from_genre(genre: &Genre) -> Self {
        Self {
            name: genre.name().to_owned(),
            color: genre.color().to_owned(),
            is_default: genre.is_default(),
            created_at: genre.created_at(),
        }
    }
}

/// Insert shape for a reading list; the repository allocates the id.
#[derive(Debug, Clone)]
pub struct NewListRecord {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl NewListRecord {
    #[must_use]
    pub fn from_list(list: &ReadingList) -> Self {
        Self {
            name: list.name().to_owned(),
            description: list.description().map(str::to_owned),
            color: list.color().to_owned(),
            created_at: list.created_at(),
        }
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book and return its allocated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the book cannot be stored.
    async fn insert_new_book(&self, record: NewBookRecord) -> Result<BookId, StorageError>;

    /// Persist updated fields for an existing book.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the book does not exist.
    async fn update_book(&self, book: &Book) -> Result<(), StorageError>;

    /// Fetch a book by id. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError>;

    /// List books, newest first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_books(&self, limit: u32) -> Result<Vec<Book>, StorageError>;

    /// List books by most recent activity (`updated_at` descending).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn recently_updated(&self, limit: u32) -> Result<Vec<Book>, StorageError>;

    /// Delete a book. Its sessions and list memberships go with it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the book does not exist.
    async fn delete_book(&self, id: BookId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Record a reading session and persist the book's advanced progress in
    /// one atomic step: either both writes land or neither does.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the book does not exist, or
    /// other storage errors; in every error case no partial write remains.
    async fn log_reading(
        &self,
        record: NewSessionRecord,
        book: &Book,
    ) -> Result<SessionId, StorageError>;

    /// Most recent sessions first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_sessions(&self, limit: u32) -> Result<Vec<ReadingSession>, StorageError>;

    /// Sessions for one book, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn sessions_for_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReadingSession>, StorageError>;

    /// Sessions whose date falls within `[from, to]`, ascending by date.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn sessions_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReadingSession>, StorageError>;
}

#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Insert a new goal and return its allocated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the goal cannot be stored.
    async fn insert_new_goal(&self, record: NewGoalRecord) -> Result<GoalId, StorageError>;

    /// Fetch a goal by id. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn get_goal(&self, id: GoalId) -> Result<Option<Goal>, StorageError>;

    /// Active goals, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_active_goals(&self) -> Result<Vec<Goal>, StorageError>;

    /// Flip a goal's active flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the goal does not exist.
    async fn set_goal_active(&self, id: GoalId, is_active: bool) -> Result<(), StorageError>;
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// Insert a new genre and return its allocated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the genre cannot be stored.
    async fn insert_new_genre(&self, record: NewGenreRecord) -> Result<GenreId, StorageError>;

    /// All genres, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_genres(&self) -> Result<Vec<Genre>, StorageError>;

    /// Persist updated fields for an existing genre.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the genre does not exist.
    async fn update_genre(&self, genre: &Genre) -> Result<(), StorageError>;

    /// Delete a genre; books shelved under it keep existing with no genre.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the genre does not exist.
    async fn delete_genre(&self, id: GenreId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Insert a new reading list and return its allocated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be stored.
    async fn insert_new_list(&self, record: NewListRecord) -> Result<ListId, StorageError>;

    /// All reading lists, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_reading_lists(&self) -> Result<Vec<ReadingList>, StorageError>;

    /// Delete a list and its memberships. The books themselves survive.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the list does not exist.
    async fn delete_list(&self, id: ListId) -> Result<(), StorageError>;

    /// Add a book to a list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when either side does not exist and
    /// `StorageError::Conflict` when the membership already exists.
    async fn add_book_to_list(&self, list_id: ListId, book_id: BookId)
    -> Result<(), StorageError>;

    /// Remove a book from a list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the membership does not exist.
    async fn remove_book_from_list(
        &self,
        list_id: ListId,
        book_id: BookId,
    ) -> Result<(), StorageError>;

    /// Ids of the books in a list, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the list does not exist.
    async fn books_in_list(&self, list_id: ListId) -> Result<Vec<BookId>, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    books: HashMap<BookId, Book>,
    sessions: Vec<ReadingSession>,
    goals: HashMap<GoalId, Goal>,
    genres: HashMap<GenreId, Genre>,
    lists: HashMap<ListId, ReadingList>,
    memberships: Vec<(ListId, BookId)>,
    next_book_id: u64,
    next_session_id: u64,
    next_goal_id: u64,
    next_genre_id: u64,
    next_list_id: u64,
}

/// In-memory repository for tests and prototyping.
///
/// All tables share one lock, which is what makes `log_reading` atomic here:
/// the session insert and the book update happen under a single guard.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl BookRepository for InMemoryRepository {
    async fn insert_new_book(&self, record: NewBookRecord) -> Result<BookId, StorageError> {
        let mut state = self.lock()?;
        state.next_book_id += 1;
        let id = BookId::new(state.next_book_id);
        let book = book_from_record(id, &record)?;
        state.books.insert(id, book);
        Ok(id)
    }

    async fn update_book(&self, book: &Book) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if !state.books.contains_key(&book.id()) {
            return Err(StorageError::NotFound);
        }
        state.books.insert(book.id(), book.clone());
        Ok(())
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError> {
        let state = self.lock()?;
        Ok(state.books.get(&id).cloned())
    }

    async fn list_books(&self, limit: u32) -> Result<Vec<Book>, StorageError> {
        let state = self.lock()?;
        let mut books: Vec<Book> = state.books.values().cloned().collect();
        books.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        books.truncate(limit as usize);
        Ok(books)
    }

    async fn recently_updated(&self, limit: u32) -> Result<Vec<Book>, StorageError> {
        let state = self.lock()?;
        let mut books: Vec<Book> = state.books.values().cloned().collect();
        books.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()).then(b.id().cmp(&a.id())));
        books.truncate(limit as usize);
        Ok(books)
    }

    async fn delete_book(&self, id: BookId) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.books.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        state.sessions.retain(|s| s.book_id() != id);
        state.memberships.retain(|(_, book_id)| *book_id != id);
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn log_reading(
        &self,
        record: NewSessionRecord,
        book: &Book,
    ) -> Result<SessionId, StorageError> {
        let mut state = self.lock()?;
        if !state.books.contains_key(&book.id()) {
            return Err(StorageError::NotFound);
        }

        state.next_session_id += 1;
        let id = SessionId::new(state.next_session_id);
        let session = session_from_record(id, &record)?;

        state.sessions.push(session);
        state.books.insert(book.id(), book.clone());
        Ok(id)
    }

    async fn list_sessions(&self, limit: u32) -> Result<Vec<ReadingSession>, StorageError> {
        let state = self.lock()?;
        let mut sessions = state.sessions.clone();
        sessions.sort_by(|a, b| {
            b.session_date()
                .cmp(&a.session_date())
                .then(b.id().cmp(&a.id()))
        });
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn sessions_for_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReadingSession>, StorageError> {
        let state = self.lock()?;
        let mut sessions: Vec<ReadingSession> = state
            .sessions
            .iter()
            .filter(|s| s.book_id() == book_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            b.session_date()
                .cmp(&a.session_date())
                .then(b.id().cmp(&a.id()))
        });
        Ok(sessions)
    }

    async fn sessions_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReadingSession>, StorageError> {
        let state = self.lock()?;
        let mut sessions: Vec<ReadingSession> = state
            .sessions
            .iter()
            .filter(|s| s.session_date() >= from && s.session_date() <= to)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            a.session_date()
                .cmp(&b.session_date())
                .then(a.id().cmp(&b.id()))
        });
        Ok(sessions)
    }
}

#[async_trait]
impl GoalRepository for InMemoryRepository {
    async fn insert_new_goal(&self, record: NewGoalRecord) -> Result<GoalId, StorageError> {
        let mut state = self.lock()?;
        state.next_goal_id += 1;
        let id = GoalId::new(state.next_goal_id);
        let goal = Goal::new(
            id,
            record.goal_type,
            record.target_value,
            record.period_start,
            record.period_end,
            record.is_active,
            record.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.goals.insert(id, goal);
        Ok(id)
    }

    async fn get_goal(&self, id: GoalId) -> Result<Option<Goal>, StorageError> {
        let state = self.lock()?;
        Ok(state.goals.get(&id).cloned())
    }

    async fn list_active_goals(&self) -> Result<Vec<Goal>, StorageError> {
        let state = self.lock()?;
        let mut goals: Vec<Goal> = state
            .goals
            .values()
            .filter(|g| g.is_active())
            .cloned()
            .collect();
        goals.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        Ok(goals)
    }

    async fn set_goal_active(&self, id: GoalId, is_active: bool) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let goal = state.goals.get_mut(&id).ok_or(StorageError::NotFound)?;
        if is_active != goal.is_active() {
            if is_active {
                // Reactivation has no domain path; rebuild to keep Goal sealed.
                let rebuilt = Goal::new(
                    goal.id(),
                    goal.goal_type(),
                    goal.target_value(),
                    goal.period_start(),
                    goal.period_end(),
                    true,
                    goal.created_at(),
                )
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
                *goal = rebuilt;
            } else {
                goal.deactivate();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GenreRepository for InMemoryRepository {
    async fn insert_new_genre(&self, record: NewGenreRecord) -> Result<GenreId, StorageError> {
        let mut state = self.lock()?;
        state.next_genre_id += 1;
        let id = GenreId::new(state.next_genre_id);
        let genre = Genre::new(
            id,
            record.name,
            record.color,
            record.is_default,
            record.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.genres.insert(id, genre);
        Ok(id)
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, StorageError> {
        let state = self.lock()?;
        let mut genres: Vec<Genre> = state.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(genres)
    }

    async fn update_genre(&self, genre: &Genre) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if !state.genres.contains_key(&genre.id()) {
            return Err(StorageError::NotFound);
        }
        state.genres.insert(genre.id(), genre.clone());
        Ok(())
    }

    async fn delete_genre(&self, id: GenreId) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.genres.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        // Mirror the SQL ON DELETE SET NULL: shelved books lose the genre.
        let orphaned: Vec<Book> = state
            .books
            .values()
            .filter(|b| b.genre_id() == Some(id))
            .cloned()
            .collect();
        for book in orphaned {
            let cleared = clear_genre(&book)?;
            state.books.insert(cleared.id(), cleared);
        }
        Ok(())
    }
}

#[async_trait]
impl ListRepository for InMemoryRepository {
    async fn insert_new_list(&self, record: NewListRecord) -> Result<ListId, StorageError> {
        let mut state = self.lock()?;
        state.next_list_id += 1;
        let id = ListId::new(state.next_list_id);
        let list = ReadingList::new(
            id,
            record.name,
            record.description,
            record.color,
            record.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.lists.insert(id, list);
        Ok(id)
    }

    async fn list_reading_lists(&self) -> Result<Vec<ReadingList>, StorageError> {
        let state = self.lock()?;
        let mut lists: Vec<ReadingList> = state.lists.values().cloned().collect();
        lists.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        Ok(lists)
    }

    async fn delete_list(&self, id: ListId) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.lists.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        state.memberships.retain(|(list_id, _)| *list_id != id);
        Ok(())
    }

    async fn add_book_to_list(
        &self,
        list_id: ListId,
        book_id: BookId,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if !state.lists.contains_key(&list_id) || !state.books.contains_key(&book_id) {
            return Err(StorageError::NotFound);
        }
        if state.memberships.contains(&(list_id, book_id)) {
            return Err(StorageError::Conflict);
        }
        state.memberships.push((list_id, book_id));
        Ok(())
    }

    async fn remove_book_from_list(
        &self,
        list_id: ListId,
        book_id: BookId,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let before = state.memberships.len();
        state
            .memberships
            .retain(|entry| *entry != (list_id, book_id));
        if state.memberships.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn books_in_list(&self, list_id: ListId) -> Result<Vec<BookId>, StorageError> {
        let state = self.lock()?;
        if !state.lists.contains_key(&list_id) {
            return Err(StorageError::NotFound);
        }
        Ok(state
            .memberships
            .iter()
            .filter(|(l, _)| *l == list_id)
            .map(|(_, b)| *b)
            .collect())
    }
}

fn book_from_record(id: BookId, record: &NewBookRecord) -> Result<Book, StorageError> {
    Book::from_persisted(
        id,
        record.title.clone(),
        record.author.clone(),
        record.publication_year,
        record.genre_id,
        record.total_pages,
        record.cover_url.clone(),
        record.isbn.clone(),
        record.description.clone(),
        reading_core::model::BookStatus::NotStarted,
        record.personal_rating,
        0,
        None,
        None,
        record.created_at,
        record.created_at,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}

fn session_from_record(
    id: SessionId,
    record: &NewSessionRecord,
) -> Result<ReadingSession, StorageError> {
    ReadingSession::from_persisted(
        id,
        record.book_id,
        record.session_date,
        record.pages_read,
        record.start_page,
        record.end_page,
        record.duration_minutes,
        record.notes.clone(),
        record.created_at,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}

fn clear_genre(book: &Book) -> Result<Book, StorageError> {
    Book::from_persisted(
        book.id(),
        book.title().to_owned(),
        book.author().to_owned(),
        book.publication_year(),
        None,
        book.total_pages(),
        book.cover_url().map(str::to_owned),
        book.isbn().map(str::to_owned),
        book.description().map(str::to_owned),
        book.status(),
        book.personal_rating(),
        book.current_page(),
        book.started_at(),
        book.completed_at(),
        book.created_at(),
        book.updated_at(),
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub books: Arc<dyn BookRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub goals: Arc<dyn GoalRepository>,
    pub genres: Arc<dyn GenreRepository>,
    pub lists: Arc<dyn ListRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            books: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            goals: Arc::new(repo.clone()),
            genres: Arc::new(repo.clone()),
            lists: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reading_core::model::BookDraft;
    use reading_core::time::{fixed_now, fixed_today};

    fn draft(title: &str) -> NewBookRecord {
        let book = BookDraft::new(title, "Author")
            .with_total_pages(100)
            .build(BookId::new(0), fixed_now())
            .unwrap();
        NewBookRecord::from_book(&book)
    }

    fn new_session(book_id: BookId, pages: u32) -> NewSessionRecord {
        NewSessionRecord {
            book_id,
            session_date: fixed_today(),
            pages_read: pages,
            start_page: None,
            end_page: None,
            duration_minutes: 30,
            notes: None,
            created_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn insert_allocates_sequential_ids() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_new_book(draft("One")).await.unwrap();
        let second = repo.insert_new_book(draft("Two")).await.unwrap();
        assert_ne!(first, second);
        assert!(repo.get_book(first).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn log_reading_persists_session_and_book_together() {
        let repo = InMemoryRepository::new();
        let id = repo.insert_new_book(draft("One")).await.unwrap();
        let mut book = repo.get_book(id).await.unwrap().unwrap();
        book.apply_session(40, fixed_now());

        let session_id = repo
            .log_reading(new_session(id, 40), &book)
            .await
            .unwrap();
        assert_eq!(session_id, SessionId::new(1));

        let stored = repo.get_book(id).await.unwrap().unwrap();
        assert_eq!(stored.current_page(), 40);
        let sessions = repo.sessions_for_book(id).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].pages_read(), 40);
    }

    #[tokio::test]
    async fn log_reading_for_missing_book_leaves_no_session() {
        let repo = InMemoryRepository::new();
        let ghost = BookDraft::new("Ghost", "Nobody")
            .build(BookId::new(99), fixed_now())
            .unwrap();
        let err = repo
            .log_reading(new_session(BookId::new(99), 10), &ghost)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        assert!(repo.list_sessions(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_book_cascades_to_sessions_and_memberships() {
        let repo = InMemoryRepository::new();
        let book_id = repo.insert_new_book(draft("One")).await.unwrap();
        let mut book = repo.get_book(book_id).await.unwrap().unwrap();
        book.apply_session(10, fixed_now());
        repo.log_reading(new_session(book_id, 10), &book)
            .await
            .unwrap();

        let list_id = repo
            .insert_new_list(NewListRecord {
                name: "Favorites".into(),
                description: None,
                color: "#8b5cf6".into(),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        repo.add_book_to_list(list_id, book_id).await.unwrap();

        repo.delete_book(book_id).await.unwrap();
        assert!(repo.list_sessions(10).await.unwrap().is_empty());
        assert!(repo.books_in_list(list_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_genre_unshelves_books() {
        let repo = InMemoryRepository::new();
        let genre_id = repo
            .insert_new_genre(NewGenreRecord {
                name: "Fantasy".into(),
                color: "#6366f1".into(),
                is_default: false,
                created_at: fixed_now(),
            })
            .await
            .unwrap();

        let mut record = draft("One");
        record.genre_id = Some(genre_id);
        let book_id = repo.insert_new_book(record).await.unwrap();

        repo.delete_genre(genre_id).await.unwrap();
        let book = repo.get_book(book_id).await.unwrap().unwrap();
        assert_eq!(book.genre_id(), None);
    }

    #[tokio::test]
    async fn duplicate_membership_is_a_conflict() {
        let repo = InMemoryRepository::new();
        let book_id = repo.insert_new_book(draft("One")).await.unwrap();
        let list_id = repo
            .insert_new_list(NewListRecord {
                name: "Loans".into(),
                description: None,
                color: "#8b5cf6".into(),
                created_at: fixed_now(),
            })
            .await
            .unwrap();

        repo.add_book_to_list(list_id, book_id).await.unwrap();
        let err = repo.add_book_to_list(list_id, book_id).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn sessions_in_range_is_inclusive_and_sorted() {
        let repo = InMemoryRepository::new();
        let book_id = repo.insert_new_book(draft("One")).await.unwrap();
        let mut book = repo.get_book(book_id).await.unwrap().unwrap();

        for (days_ago, pages) in [(2_u64, 5_u32), (1, 10), (0, 15)] {
            book.apply_session(pages, fixed_now());
            let mut record = new_session(book_id, pages);
            record.session_date = fixed_today() - chrono::Days::new(days_ago);
            repo.log_reading(record, &book).await.unwrap();
        }

        let from = fixed_today() - chrono::Days::new(1);
        let sessions = repo.sessions_in_range(from, fixed_today()).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_date(), from);
        assert_eq!(sessions[1].session_date(), fixed_today());
    }
}
