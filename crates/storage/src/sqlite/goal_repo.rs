use reading_core::model::{Goal, GoalId};

use super::{
    SqliteRepository,
    mapping::{goal_id_from_i64, goal_type_to_str, id_to_i64, map_goal_row},
};
use crate::repository::{GoalRepository, NewGoalRecord, StorageError};

const GOAL_COLUMNS: &str = r"
    id, goal_type, target_value, period_start, period_end, is_active, created_at
";

#[async_trait::async_trait]
impl GoalRepository for SqliteRepository {
    async fn insert_new_goal(&self, record: NewGoalRecord) -> Result<GoalId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO reading_goals (
                goal_type, target_value, period_start, period_end, is_active, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(goal_type_to_str(record.goal_type))
        .bind(i64::from(record.target_value))
        .bind(record.period_start)
        .bind(record.period_end)
        .bind(i64::from(record.is_active))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        goal_id_from_i64(result.last_insert_rowid())
    }

    async fn get_goal(&self, id: GoalId) -> Result<Option<Goal>, StorageError> {
        let sql = format!("SELECT {GOAL_COLUMNS} FROM reading_goals WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64("goal_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_goal_row).transpose()
    }

    async fn list_active_goals(&self) -> Result<Vec<Goal>, StorageError> {
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM reading_goals
             WHERE is_active = 1
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_goal_row).collect()
    }

    async fn set_goal_active(&self, id: GoalId, is_active: bool) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE reading_goals SET is_active = ?2 WHERE id = ?1")
            .bind(id_to_i64("goal_id", id.value())?)
            .bind(i64::from(is_active))
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
