/// Task tags (append-only)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use sqlx::PgExecutor;

/// Tag row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Tag {
    pub id: i32,
    pub task_id: i32,
    pub user_id: Option<i32>,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Attaches a tag to a task
    pub async fn create<'e, E>(
        executor: E,
        task_id: i32,
        user_id: Option<i32>,
        tag: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (task_id, user_id, tag)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, tag, created_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(tag)
        .fetch_one(executor)
        .await
    }

    /// Tags of a task in insertion order
    pub async fn find_all_by_task_id<'e, E>(executor: E, task_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>(
            "SELECT id, task_id, user_id, tag, created_at FROM tags WHERE task_id = $1 ORDER BY id",
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }
}
