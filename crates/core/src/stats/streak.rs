use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::ReadingSession;

/// Number of consecutive calendar days ending at `today` with at least one
/// session.
///
/// Walks backward one day at a time over the distinct set of session dates
/// and stops at the first gap. A day without a session *today* means a streak
/// of 0, even if yesterday had one — the streak must include today.
#[must_use]
pub fn current_streak(sessions: &[ReadingSession], today: NaiveDate) -> u32 {
    let dates: BTreeSet<NaiveDate> = sessions
        .iter()
        .map(ReadingSession::session_date)
        .collect();

    let mut streak = 0;
    let mut day = today;
    while dates.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}
