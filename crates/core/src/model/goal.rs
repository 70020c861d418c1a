use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::GoalId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GoalError {
    #[error("goal target must be > 0")]
    InvalidTarget,

    #[error("goal period end is before its start")]
    InvalidPeriod,

    #[error("unknown goal type: {raw}")]
    UnknownType { raw: String },
}

//
// ─── GOAL TYPE ─────────────────────────────────────────────────────────────────
//

/// What a goal counts and over which horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalType {
    /// Pages read per calendar day.
    DailyPages,
    /// Books completed per calendar month.
    MonthlyBooks,
    /// Books completed per calendar year.
    YearlyBooks,
}

impl GoalType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::DailyPages => "daily_pages",
            GoalType::MonthlyBooks => "monthly_books",
            GoalType::YearlyBooks => "yearly_books",
        }
    }

    /// The tracking period a goal of this type covers when created on `today`.
    ///
    /// Daily goals span today through tomorrow; monthly goals the first
    /// through last day of the month; yearly goals January 1 through
    /// December 31.
    ///
    /// # Panics
    ///
    /// Panics only if `today` is at the edge of chrono's representable range.
    #[must_use]
    pub fn period_for(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            GoalType::DailyPages => {
                let end = today.succ_opt().expect("date range exhausted");
                (today, end)
            }
            GoalType::MonthlyBooks => {
                let start = today.with_day(1).expect("day 1 always exists");
                let next_month = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                }
                .expect("first of month always exists");
                let end = next_month.pred_opt().expect("date range exhausted");
                (start, end)
            }
            GoalType::YearlyBooks => {
                let start =
                    NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("jan 1 always exists");
                let end =
                    NaiveDate::from_ymd_opt(today.year(), 12, 31).expect("dec 31 always exists");
                (start, end)
            }
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = GoalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily_pages" => Ok(GoalType::DailyPages),
            "monthly_books" => Ok(GoalType::MonthlyBooks),
            "yearly_books" => Ok(GoalType::YearlyBooks),
            other => Err(GoalError::UnknownType {
                raw: other.to_owned(),
            }),
        }
    }
}

//
// ─── GOAL ──────────────────────────────────────────────────────────────────────
//

/// A user-defined reading target tracked against live data.
///
/// Progress is always computed relative to "now", never frozen at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    id: GoalId,
    goal_type: GoalType,
    target_value: u32,
    period_start: NaiveDate,
    period_end: NaiveDate,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl Goal {
    /// Creates a new goal.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::InvalidTarget` when `target_value` is zero and
    /// `GoalError::InvalidPeriod` when the period is inverted.
    pub fn new(
        id: GoalId,
        goal_type: GoalType,
        target_value: u32,
        period_start: NaiveDate,
        period_end: NaiveDate,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, GoalError> {
        if target_value == 0 {
            return Err(GoalError::InvalidTarget);
        }
        if period_end < period_start {
            return Err(GoalError::InvalidPeriod);
        }

        Ok(Self {
            id,
            goal_type,
            target_value,
            period_start,
            period_end,
            is_active,
            created_at,
        })
    }

    /// Convenience constructor: a goal created on `today` with the period
    /// derived from its type.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::InvalidTarget` when `target_value` is zero.
    pub fn starting(
        id: GoalId,
        goal_type: GoalType,
        target_value: u32,
        today: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, GoalError> {
        let (period_start, period_end) = goal_type.period_for(today);
        Self::new(
            id,
            goal_type,
            target_value,
            period_start,
            period_end,
            true,
            created_at,
        )
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> GoalId {
        self.id
    }

    #[must_use]
    pub fn goal_type(&self) -> GoalType {
        self.goal_type
    }

    #[must_use]
    pub fn target_value(&self) -> u32 {
        self.target_value
    }

    #[must_use]
    pub fn period_start(&self) -> NaiveDate {
        self.period_start
    }

    #[must_use]
    pub fn period_end(&self) -> NaiveDate {
        self.period_end
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mark the goal inactive. Deactivation is the only state change a goal
    /// ever undergoes.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{fixed_now, fixed_today};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn goal_rejects_zero_target() {
        let err = Goal::starting(
            GoalId::new(1),
            GoalType::DailyPages,
            0,
            fixed_today(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, GoalError::InvalidTarget);
    }

    #[test]
    fn goal_rejects_inverted_period() {
        let err = Goal::new(
            GoalId::new(1),
            GoalType::MonthlyBooks,
            2,
            date(2025, 3, 31),
            date(2025, 3, 1),
            true,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, GoalError::InvalidPeriod);
    }

    #[test]
    fn daily_period_spans_today_and_tomorrow() {
        let (start, end) = GoalType::DailyPages.period_for(date(2025, 3, 15));
        assert_eq!(start, date(2025, 3, 15));
        assert_eq!(end, date(2025, 3, 16));
    }

    #[test]
    fn monthly_period_covers_whole_month() {
        let (start, end) = GoalType::MonthlyBooks.period_for(date(2025, 3, 15));
        assert_eq!(start, date(2025, 3, 1));
        assert_eq!(end, date(2025, 3, 31));
    }

    #[test]
    fn monthly_period_handles_leap_february() {
        let (start, end) = GoalType::MonthlyBooks.period_for(date(2024, 2, 10));
        assert_eq!(start, date(2024, 2, 1));
        assert_eq!(end, date(2024, 2, 29));
    }

    #[test]
    fn monthly_period_handles_december_rollover() {
        let (start, end) = GoalType::MonthlyBooks.period_for(date(2025, 12, 20));
        assert_eq!(start, date(2025, 12, 1));
        assert_eq!(end, date(2025, 12, 31));
    }

    #[test]
    fn yearly_period_spans_calendar_year() {
        let (start, end) = GoalType::YearlyBooks.period_for(date(2025, 7, 4));
        assert_eq!(start, date(2025, 1, 1));
        assert_eq!(end, date(2025, 12, 31));
    }

    #[test]
    fn goal_type_string_roundtrip() {
        for goal_type in [
            GoalType::DailyPages,
            GoalType::MonthlyBooks,
            GoalType::YearlyBooks,
        ] {
            let parsed: GoalType = goal_type.as_str().parse().unwrap();
            assert_eq!(parsed, goal_type);
        }
        assert!("weekly_pages".parse::<GoalType>().is_err());
    }

    #[test]
    fn deactivate_flips_active_flag() {
        let mut goal = Goal::starting(
            GoalId::new(1),
            GoalType::YearlyBooks,
            12,
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
        assert!(goal.is_active());
        goal.deactivate();
        assert!(!goal.is_active());
    }
}
