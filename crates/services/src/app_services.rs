use std::sync::Arc;

use reading_core::Clock;
use reading_core::model::{Genre, GenreId};
use storage::repository::{GenreRepository, NewGenreRecord, Storage};
use tracing::info;

use crate::book_service::BookService;
use crate::error::AppServicesError;
use crate::genre_service::GenreService;
use crate::goal_service::GoalService;
use crate::list_service::ListService;
use crate::reading_service::ReadingService;
use crate::stats_service::StatsService;

/// Starter genres created on first run against an empty database.
const DEFAULT_GENRES: [(&str, &str); 4] = [
    ("Fantasy", "#8b5cf6"),
    ("Science Fiction", "#6366f1"),
    ("Literary Fiction", "#10b981"),
    ("Non-fiction", "#f59e0b"),
];

/// Assembles app-facing services over a shared storage backend.
#[derive(Clone)]
pub struct AppServices {
    book_service: Arc<BookService>,
    reading_service: Arc<ReadingService>,
    goal_service: Arc<GoalService>,
    stats_service: Arc<StatsService>,
    genre_service: Arc<GenreService>,
    list_service: Arc<ListService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or default genre
    /// setup fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        ensure_default_genres(storage.genres.as_ref(), clock).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Assemble services over an already-open storage backend.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let book_service = Arc::new(BookService::new(clock, Arc::clone(&storage.books)));
        let reading_service = Arc::new(ReadingService::new(
            clock,
            Arc::clone(&storage.books),
            Arc::clone(&storage.sessions),
        ));
        let goal_service = Arc::new(GoalService::new(
            clock,
            Arc::clone(&storage.goals),
            Arc::clone(&storage.books),
            Arc::clone(&storage.sessions),
        ));
        let stats_service = Arc::new(StatsService::new(
            clock,
            Arc::clone(&storage.books),
            Arc::clone(&storage.sessions),
        ));
        let genre_service = Arc::new(GenreService::new(clock, Arc::clone(&storage.genres)));
        let list_service = Arc::new(ListService::new(
            clock,
            Arc::clone(&storage.lists),
            Arc::clone(&storage.books),
        ));

        Self {
            book_service,
            reading_service,
            goal_service,
            stats_service,
            genre_service,
            list_service,
        }
    }

    #[must_use]
    pub fn books(&self) -> Arc<BookService> {
        Arc::clone(&self.book_service)
    }

    #[must_use]
    pub fn reading(&self) -> Arc<ReadingService> {
        Arc::clone(&self.reading_service)
    }

    #[must_use]
    pub fn goals(&self) -> Arc<GoalService> {
        Arc::clone(&self.goal_service)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats_service)
    }

    #[must_use]
    pub fn genres(&self) -> Arc<GenreService> {
        Arc::clone(&self.genre_service)
    }

    #[must_use]
    pub fn lists(&self) -> Arc<ListService> {
        Arc::clone(&self.list_service)
    }
}

/// Seed the starter genres once, on an empty shelf.
async fn ensure_default_genres(
    genres: &dyn GenreRepository,
    clock: Clock,
) -> Result<(), AppServicesError> {
    if !genres.list_genres().await?.is_empty() {
        return Ok(());
    }

    let now = clock.now();
    for (name, color) in DEFAULT_GENRES {
        let genre = Genre::new(GenreId::new(1), name, color, true, now)?;
        genres
            .insert_new_genre(NewGenreRecord::from_genre(&genre))
            .await?;
    }
    info!(count = DEFAULT_GENRES.len(), "seeded default genres");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reading_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn default_genres_seed_only_once() {
        let repo = InMemoryRepository::new();
        ensure_default_genres(&repo, fixed_clock()).await.unwrap();
        assert_eq!(repo.list_genres().await.unwrap().len(), DEFAULT_GENRES.len());

        ensure_default_genres(&repo, fixed_clock()).await.unwrap();
        assert_eq!(repo.list_genres().await.unwrap().len(), DEFAULT_GENRES.len());
    }

    #[tokio::test]
    async fn from_storage_wires_every_service() {
        let storage = Storage::in_memory();
        let services = AppServices::from_storage(&storage, fixed_clock());

        assert!(services.books().list_books(10).await.unwrap().is_empty());
        assert!(services.goals().active_goals().await.unwrap().is_empty());
        assert!(services.lists().lists().await.unwrap().is_empty());
        assert_eq!(services.stats().dashboard(6).await.unwrap().stats.total_books, 0);
    }
}
