use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Book, BookStatus, ReadingSession};
use crate::stats::goals::{completed_in_window, pages_read_on, start_of_month};
use crate::stats::streak::current_streak;

/// Header aggregates for the overview screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_books: u32,
    pub books_in_progress: u32,
    pub books_completed: u32,
    pub pages_read_today: u32,
    pub current_streak: u32,
    pub books_completed_this_month: u32,
}

/// Derive the dashboard aggregates from full book and session snapshots.
#[must_use]
pub fn dashboard_stats(
    books: &[Book],
    sessions: &[ReadingSession],
    now: DateTime<Utc>,
) -> DashboardStats {
    let count_status = |status: BookStatus| {
        let count = books.iter().filter(|b| b.status() == status).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    };

    DashboardStats {
        total_books: u32::try_from(books.len()).unwrap_or(u32::MAX),
        books_in_progress: count_status(BookStatus::InProgress),
        books_completed: count_status(BookStatus::Completed),
        pages_read_today: pages_read_on(sessions, now.date_naive()),
        current_streak: current_streak(sessions, now.date_naive()),
        books_completed_this_month: completed_in_window(books, start_of_month(now), now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookDraft, BookId, SessionId};
    use crate::time::{fixed_now, fixed_today};
    use chrono::{Days, Duration};

    fn book(id: u64) -> Book {
        BookDraft::new(format!("Book {id}"), "Author")
            .with_total_pages(100)
            .build(BookId::new(id), fixed_now())
            .unwrap()
    }

    fn reading_book(id: u64, pages: u32) -> Book {
        let mut b = book(id);
        b.apply_session(pages, fixed_now());
        b
    }

    fn session(id: u64, days_ago: u64, pages: u32) -> ReadingSession {
        ReadingSession::new(
            SessionId::new(id),
            BookId::new(1),
            fixed_today() - Days::new(days_ago),
            pages,
            30,
            fixed_now(),
        )
    }

    #[test]
    fn empty_snapshots_produce_all_zeroes() {
        let stats = dashboard_stats(&[], &[], fixed_now());
        assert_eq!(
            stats,
            DashboardStats {
                total_books: 0,
                books_in_progress: 0,
                books_completed: 0,
                pages_read_today: 0,
                current_streak: 0,
                books_completed_this_month: 0,
            }
        );
    }

    #[test]
    fn aggregates_cover_all_six_fields() {
        let books = vec![
            book(1),                  // not started
            reading_book(2, 40),      // in progress
            reading_book(3, 100),     // completed now (this month)
            {
                let mut b = book(4);
                b.apply_session(100, fixed_now() - Duration::days(45));
                b // completed, but in an earlier month
            },
        ];
        let sessions = vec![
            session(1, 0, 25),
            session(2, 0, 10),
            session(3, 1, 15),
            // gap two days ago
            session(4, 3, 5),
        ];

        let stats = dashboard_stats(&books, &sessions, fixed_now());
        assert_eq!(stats.total_books, 4);
        assert_eq!(stats.books_in_progress, 1);
        assert_eq!(stats.books_completed, 2);
        assert_eq!(stats.pages_read_today, 35);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.books_completed_this_month, 1);
    }
}
