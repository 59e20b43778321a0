/// Task shares
///
/// A share grants one user the right to view and edit a private task. The
/// share set of a task is always written wholesale: existing rows are
/// removed and the new set inserted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE share_with (
///     task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};

/// Share row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShareWith {
    pub task_id: i32,
    pub user_id: i32,
}

impl ShareWith {
    /// Replaces the share set of a task
    ///
    /// Duplicate user IDs collapse into one row. Run inside a transaction so
    /// the delete and insert are applied together.
    pub async fn replace_for_task(
        conn: &mut PgConnection,
        task_id: i32,
        user_ids: &[i32],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query("DELETE FROM share_with WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *conn)
            .await?;

        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, ShareWith>(
            r#"
            INSERT INTO share_with (task_id, user_id)
            SELECT $1, user_id FROM UNNEST($2::int4[]) AS ids(user_id)
            ON CONFLICT (task_id, user_id) DO NOTHING
            RETURNING task_id, user_id
            "#,
        )
        .bind(task_id)
        .bind(user_ids)
        .fetch_all(&mut *conn)
        .await
    }

    /// User IDs a task is shared with, ascending
    pub async fn list_user_ids<'e, E>(executor: E, task_id: i32) -> Result<Vec<i32>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT user_id FROM share_with WHERE task_id = $1 ORDER BY user_id")
            .bind(task_id)
            .fetch_all(executor)
            .await
    }

    /// Whether a task is shared with a user
    pub async fn is_shared_with<'e, E>(
        executor: E,
        task_id: i32,
        user_id: i32,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM share_with WHERE task_id = $1 AND user_id = $2)",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Number of users a task is shared with
    pub async fn count_for_task<'e, E>(executor: E, task_id: i32) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM share_with WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(executor)
            .await
    }
}
