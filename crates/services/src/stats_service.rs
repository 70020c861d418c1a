use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use reading_core::Clock;
use reading_core::model::{Book, ReadingSession};
use reading_core::stats::{
    DashboardStats, DayActivity, MonthGrid, MonthSummary, build_heatmap, dashboard_stats,
    month_summary,
};
use storage::repository::{BookRepository, SessionRepository};

use crate::error::StatsServiceError;

/// Overview screen data: aggregates plus the most recently touched books.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub recent_books: Vec<Book>,
}

/// Calendar screen data for one month.
#[derive(Debug, Clone)]
pub struct MonthView {
    pub grid: MonthGrid,
    pub summary: MonthSummary,
    pub days: BTreeMap<NaiveDate, DayActivity>,
    pub sessions: Vec<ReadingSession>,
}

/// Loads snapshots and hands them to the pure stats engine.
#[derive(Clone)]
pub struct StatsService {
    clock: Clock,
    books: Arc<dyn BookRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl StatsService {
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

    /// Assemble the overview: header aggregates and recent books.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if loading snapshots fails.
    pub async fn dashboard(&self, recent_limit: u32) -> Result<DashboardView, StatsServiceError> {
        let books = self.books.list_books(u32::MAX).await?;
        let sessions = self.sessions.list_sessions(u32::MAX).await?;
        let stats = dashboard_stats(&books, &sessions, self.clock.now());
        let recent_books = self.books.recently_updated(recent_limit).await?;

        Ok(DashboardView {
            stats,
            recent_books,
        })
    }

    /// Daily activity buckets for a whole year.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if loading snapshots fails.
    pub async fn heatmap(
        &self,
        year: i32,
    ) -> Result<BTreeMap<NaiveDate, DayActivity>, StatsServiceError> {
        let sessions = self.year_sessions(year).await?;
        Ok(build_heatmap(&sessions, year))
    }

    /// Calendar data for one month: grid layout, summary stats, day buckets,
    /// and the month's sessions (newest first).
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::InvalidMonth` for a month outside 1..=12.
    /// Returns `StatsServiceError::Storage` if loading snapshots fails.
    pub async fn month_view(&self, year: i32, month: u32) -> Result<MonthView, StatsServiceError> {
        let grid =
            MonthGrid::new(year, month).ok_or(StatsServiceError::InvalidMonth { month })?;

        let sessions = self.year_sessions(year).await?;
        let summary = month_summary(&sessions, year, month);

        let days = build_heatmap(&sessions, year)
            .into_iter()
            .filter(|(date, _)| date.month() == month)
            .collect();

        let mut month_sessions: Vec<ReadingSession> = sessions
            .into_iter()
            .filter(|s| s.session_date().month() == month)
            .collect();
        month_sessions.sort_by(|a, b| {
            b.session_date()
                .cmp(&a.session_date())
                .then(b.id().cmp(&a.id()))
        });

        Ok(MonthView {
            grid,
            summary,
            days,
            sessions: month_sessions,
        })
    }

    async fn year_sessions(&self, year: i32) -> Result<Vec<ReadingSession>, StatsServiceError> {
        let from = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or(StatsServiceError::InvalidYear { year })?;
        let to = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or(StatsServiceError::InvalidYear { year })?;
        let sessions = self.sessions.sessions_in_range(from, to).await?;
        Ok(sessions)
    }
}
