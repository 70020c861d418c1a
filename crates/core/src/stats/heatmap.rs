use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::ReadingSession;

/// Activity bucket for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayActivity {
    pub count: u32,
    pub pages: u32,
}

impl DayActivity {
    #[must_use]
    pub fn intensity(&self) -> Intensity {
        Intensity::from_pages(self.pages)
    }
}

/// Display shade for a heatmap cell, from page volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
    Max,
}

impl Intensity {
    /// Fixed page-count thresholds: 0 / <10 / <25 / <50 / ≥50.
    #[must_use]
    pub fn from_pages(pages: u32) -> Self {
        match pages {
            0 => Intensity::None,
            1..=9 => Intensity::Low,
            10..=24 => Intensity::Medium,
            25..=49 => Intensity::High,
            _ => Intensity::Max,
        }
    }
}

/// Group sessions by day within `year`.
///
/// Sessions dated in other years are ignored. Days with no sessions have no
/// entry; renderers treat absence as [`Intensity::None`].
#[must_use]
pub fn build_heatmap(sessions: &[ReadingSession], year: i32) -> BTreeMap<NaiveDate, DayActivity> {
    let mut days: BTreeMap<NaiveDate, DayActivity> = BTreeMap::new();
    for session in sessions {
        let date = session.session_date();
        if date.year() != year {
            continue;
        }
        let bucket = days.entry(date).or_default();
        bucket.count += 1;
        bucket.pages = bucket.pages.saturating_add(session.pages_read());
    }
    days
}

/// Layout of one month for calendar rendering: leading blank cells equal to
/// the first-of-month weekday offset (weeks start on Sunday), then one cell
/// per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    year: i32,
    month: u32,
    leading_blanks: u32,
    days_in_month: u32,
}

impl MonthGrid {
    /// Returns `None` for an invalid month number.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }?;
        let days_in_month = u32::try_from((next_month - first).num_days()).ok()?;

        Some(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days_in_month,
        })
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Blank cells before day 1 when weeks start on Sunday.
    #[must_use]
    pub fn leading_blanks(&self) -> u32 {
        self.leading_blanks
    }

    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        self.days_in_month
    }

    /// Dates of the month in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let year = self.year;
        let month = self.month;
        (1..=self.days_in_month)
            .filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
    }
}

/// Aggregates shown above the calendar for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub sessions: u32,
    pub pages: u32,
    /// Rounded mean of pages per session; 0 when there are no sessions.
    pub avg_pages_per_session: u32,
}

/// Session count, page total, and rounded per-session average for the given
/// month.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn month_summary(sessions: &[ReadingSession], year: i32, month: u32) -> MonthSummary {
    let mut count: u32 = 0;
    let mut pages: u32 = 0;
    for session in sessions {
        let date = session.session_date();
        if date.year() == year && date.month() == month {
            count += 1;
            pages = pages.saturating_add(session.pages_read());
        }
    }

    let avg = if count == 0 {
        0
    } else {
        (f64::from(pages) / f64::from(count)).round() as u32
    };

    MonthSummary {
        sessions: count,
        pages,
        avg_pages_per_session: avg,
    }
}
