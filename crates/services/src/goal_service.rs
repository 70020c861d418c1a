use std::sync::Arc;

use reading_core::Clock;
use reading_core::model::{Goal, GoalId, GoalType};
use reading_core::stats::{GoalProgress, goal_progress};
use storage::repository::{BookRepository, GoalRepository, NewGoalRecord, SessionRepository};
use tracing::info;

use crate::error::GoalServiceError;

/// A goal together with its live progress, for display.
#[derive(Debug, Clone)]
pub struct GoalOverviewItem {
    pub goal: Goal,
    pub progress: GoalProgress,
}

/// Goal lifecycle plus progress computation from fresh snapshots.
#[derive(Clone)]
pub struct GoalService {
    clock: Clock,
    goals: Arc<dyn GoalRepository>,
    books: Arc<dyn BookRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl GoalService {
    #[must_use]
    pub fn new(
        clock: Clock,
        goals: Arc<dyn GoalRepository>,
        books: Arc<dyn BookRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            clock,
            goals,
            books,
            sessions,
        }
    }

    /// Create an active goal whose period starts today.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Goal` for a zero target.
    /// Returns `GoalServiceError::Storage` if persistence fails.
    pub async fn create_goal(
        &self,
        goal_type: GoalType,
        target_value: u32,
    ) -> Result<GoalId, GoalServiceError> {
        let goal = Goal::starting(
            GoalId::new(1),
            goal_type,
            target_value,
            self.clock.today(),
            self.clock.now(),
        )?;
        let goal_id = self
            .goals
            .insert_new_goal(NewGoalRecord::from_goal(&goal))
            .await?;
        info!(goal_id = %goal_id, goal_type = %goal_type, target_value, "created goal");
        Ok(goal_id)
    }

    /// Deactivate a goal. It stays stored but drops out of the active list.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if the goal does not exist.
    pub async fn deactivate_goal(&self, goal_id: GoalId) -> Result<(), GoalServiceError> {
        self.goals.set_goal_active(goal_id, false).await?;
        info!(goal_id = %goal_id, "deactivated goal");
        Ok(())
    }

    /// Active goals, newest first.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if repository access fails.
    pub async fn active_goals(&self) -> Result<Vec<Goal>, GoalServiceError> {
        let goals = self.goals.list_active_goals().await?;
        Ok(goals)
    }

    /// Compute one goal's progress against fresh snapshots.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if loading snapshots fails.
    pub async fn progress_for(&self, goal: &Goal) -> Result<GoalProgress, GoalServiceError> {
        let books = self.books.list_books(u32::MAX).await?;
        let sessions = self
            .sessions
            .sessions_in_range(goal.period_start(), goal.period_end())
            .await?;
        Ok(goal_progress(goal, &books, &sessions, self.clock.now()))
    }

    /// All active goals paired with their progress.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if repository access fails.
    pub async fn overview(&self) -> Result<Vec<GoalOverviewItem>, GoalServiceError> {
        let goals = self.active_goals().await?;
        let mut items = Vec::with_capacity(goals.len());
        for goal in goals {
            let progress = self.progress_for(&goal).await?;
            items.push(GoalOverviewItem { goal, progress });
        }
        Ok(items)
    }
}
