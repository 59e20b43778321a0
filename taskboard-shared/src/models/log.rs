/// Audit log
///
/// One row per create, update, and delete of a task. Rows are never
/// modified; once their task is gone `task_id` reads NULL.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE logs (
///     id SERIAL PRIMARY KEY,
///     task_id INTEGER REFERENCES tasks(id) ON DELETE SET NULL,
///     user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
///     action VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Audited task action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Created,
    Updated,
    Deleted,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Created => "created",
            LogAction::Updated => "updated",
            LogAction::Deleted => "deleted",
        }
    }

    /// Human-readable log line, e.g. "Task created number 12"
    pub fn describe(&self, task_id: i32) -> String {
        format!("Task {} number {}", self.as_str(), task_id)
    }
}

/// Log row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LogEntry {
    pub id: i32,
    pub task_id: Option<i32>,
    pub user_id: Option<i32>,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    /// Appends an entry for `action` on `task_id`
    ///
    /// Deletions are recorded without a task reference since the row they
    /// describe no longer exists.
    pub async fn record<'e, E>(
        executor: E,
        action: LogAction,
        task_id: i32,
        user_id: Option<i32>,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task_ref = match action {
            LogAction::Deleted => None,
            _ => Some(task_id),
        };

        Self::create(executor, task_ref, user_id, &action.describe(task_id)).await
    }

    /// Appends a raw entry
    pub async fn create<'e, E>(
        executor: E,
        task_id: Option<i32>,
        user_id: Option<i32>,
        action: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, LogEntry>(
            r#"
            INSERT INTO logs (task_id, user_id, action)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, action, created_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(action)
        .fetch_one(executor)
        .await
    }

    /// Entries referencing a task, oldest first
    pub async fn find_all_by_task_id<'e, E>(executor: E, task_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, LogEntry>(
            "SELECT id, task_id, user_id, action, created_at FROM logs WHERE task_id = $1 ORDER BY id",
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }

    /// Entries whose action text matches exactly, newest first
    pub async fn find_by_action<'e, E>(executor: E, action: &str) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, LogEntry>(
            "SELECT id, task_id, user_id, action, created_at FROM logs WHERE action = $1 ORDER BY id DESC",
        )
        .bind(action)
        .fetch_all(executor)
        .await
    }

    /// Latest `limit` entries, newest first
    pub async fn recent<'e, E>(executor: E, limit: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, LogEntry>(
            "SELECT id, task_id, user_id, action, created_at FROM logs ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(executor)
        .await
    }
}
