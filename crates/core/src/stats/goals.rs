use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{Book, BookStatus, Goal, GoalType, ReadingSession};

/// Snapshot of how far along a goal is, for display.
///
/// `current` is the raw measured value; only `percentage` is clamped to
/// [0, 100]. Nothing is persisted when a goal is achieved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    current: u32,
    target: u32,
    percentage: f64,
}

impl GoalProgress {
    fn measure(current: u32, target: u32) -> Self {
        let percentage = if target == 0 {
            0.0
        } else {
            (f64::from(current) / f64::from(target) * 100.0).min(100.0)
        };
        Self {
            current,
            target,
            percentage,
        }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Progress toward the target, clamped to [0, 100].
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// True once the target is met or exceeded. Display-only.
    #[must_use]
    pub fn achieved(&self) -> bool {
        self.percentage >= 100.0
    }
}

/// Compute a goal's progress against live data at `now`.
///
/// - `DailyPages`: pages read across sessions dated `now`'s calendar day.
/// - `MonthlyBooks`: books completed within [start of `now`'s month, `now`].
/// - `YearlyBooks`: books completed within [start of `now`'s year, `now`].
#[must_use]
pub fn goal_progress(
    goal: &Goal,
    books: &[Book],
    sessions: &[ReadingSession],
    now: DateTime<Utc>,
) -> GoalProgress {
    let current = match goal.goal_type() {
        GoalType::DailyPages => pages_read_on(sessions, now.date_naive()),
        GoalType::MonthlyBooks => {
            let start = start_of_month(now);
            completed_in_window(books, start, now)
        }
        GoalType::YearlyBooks => {
            let start = start_of_year(now);
            completed_in_window(books, start, now)
        }
    };
    GoalProgress::measure(current, goal.target_value())
}

/// Sum of pages read across sessions on the given day.
pub(crate) fn pages_read_on(sessions: &[ReadingSession], day: NaiveDate) -> u32 {
    sessions
        .iter()
        .filter(|s| s.session_date() == day)
        .map(ReadingSession::pages_read)
        .sum()
}

/// Count of books completed within `[start, now]`.
pub(crate) fn completed_in_window(books: &[Book], start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let count = books
        .iter()
        .filter(|b| b.status() == BookStatus::Completed)
        .filter(|b| {
            b.completed_at()
                .is_some_and(|at| at >= start && at <= now)
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

pub(crate) fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let day = now.date_naive();
    day.with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("first of month midnight always exists")
        .and_utc()
}

fn start_of_year(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("jan 1 midnight always exists")
        .and_utc()
}
