//! The progress and goal engine: pure derivations over book and session
//! snapshots.
//!
//! Every function here is free of I/O and ambient state — callers pass the
//! snapshots and the reference time explicitly, so identical inputs always
//! produce identical outputs.

mod dashboard;
mod goals;
mod heatmap;
mod streak;

pub use dashboard::{DashboardStats, dashboard_stats};
pub use goals::{GoalProgress, goal_progress};
pub use heatmap::{DayActivity, Intensity, MonthGrid, MonthSummary, build_heatmap, month_summary};
pub use streak::current_streak;
