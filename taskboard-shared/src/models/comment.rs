/// Task comments (append-only)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use sqlx::PgExecutor;

/// Comment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Comment {
    pub id: i32,
    pub task_id: i32,

    /// Author (None if the user was removed)
    pub user_id: Option<i32>,

    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Appends a comment to a task
    pub async fn create<'e, E>(
        executor: E,
        task_id: i32,
        user_id: Option<i32>,
        comment: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, user_id, comment)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, comment, created_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(comment)
        .fetch_one(executor)
        .await
    }

    /// Comments of a task in insertion order
    pub async fn find_all_by_task_id<'e, E>(executor: E, task_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            "SELECT id, task_id, user_id, comment, created_at FROM comments WHERE task_id = $1 ORDER BY id",
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }
}
