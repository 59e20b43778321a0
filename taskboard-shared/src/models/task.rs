/// Task model and database operations
///
/// Tasks are the primary work item. A task belongs to the user who created
/// it and may be shared with other users (see `share`), who then gain the
/// right to edit it while it is private.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL,
///     completion_status BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date DATE NOT NULL,
///     is_public BOOLEAN NOT NULL DEFAULT FALSE,
///     created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
///     responsible INTEGER REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Shares, files, comments and tags cascade when a task is deleted.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{NewTask, Task};
/// use chrono::NaiveDate;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, &NewTask {
///     title: "Quarterly report".to_string(),
///     description: "Collect numbers from finance".to_string(),
///     completion_status: false,
///     due_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
///     is_public: false,
///     created_by: 1,
///     responsible: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use sqlx::PgExecutor;

/// Task row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Task {
    /// Task ID
    pub id: i32,

    /// Short title, matched by keyword search
    pub title: String,

    /// Free-form description, matched by keyword search
    pub description: String,

    /// Whether the task is done
    pub completion_status: bool,

    /// Day the task is due
    pub due_date: NaiveDate,

    /// Public tasks are editable by anyone
    pub is_public: bool,

    /// Owner (None if the user was removed)
    pub created_by: Option<i32>,

    /// Accountable user, always a member of the share set
    pub responsible: Option<i32>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Listing projection returned by `GET /tasks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TaskSummary {
    pub id: i32,
    pub title: String,
    pub completion_status: bool,
    pub due_date: NaiveDate,
    pub is_public: bool,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub completion_status: bool,
    pub due_date: NaiveDate,
    pub is_public: bool,
    pub created_by: i32,
    pub responsible: Option<i32>,
}

/// Full replacement of a task's editable fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskChanges {
    pub title: String,
    pub description: String,
    pub completion_status: bool,
    pub due_date: NaiveDate,
    pub is_public: bool,
    pub responsible: Option<i32>,
}

impl Task {
    /// Inserts a new task
    pub async fn create<'e, E>(executor: E, data: &NewTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, completion_status, due_date, is_public, created_by, responsible)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, completion_status, due_date, is_public,
                      created_by, responsible, created_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.completion_status)
        .bind(data.due_date)
        .bind(data.is_public)
        .bind(data.created_by)
        .bind(data.responsible)
        .fetch_one(executor)
        .await
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, completion_status, due_date, is_public,
                   created_by, responsible, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a task by ID and locks the row for the rest of the transaction
    pub async fn find_by_id_for_update<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, completion_status, due_date, is_public,
                   created_by, responsible, created_at
            FROM tasks
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Replaces the editable fields of a task
    ///
    /// Returns None if the task does not exist.
    pub async fn update<'e, E>(
        executor: E,
        id: i32,
        changes: &TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                completion_status = $4,
                due_date = $5,
                is_public = $6,
                responsible = $7
            WHERE id = $1
            RETURNING id, title, description, completion_status, due_date, is_public,
                      created_by, responsible, created_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.completion_status)
        .bind(changes.due_date)
        .bind(changes.is_public)
        .bind(changes.responsible)
        .fetch_optional(executor)
        .await
    }

    /// Lists task summaries ordered by ID
    pub async fn list_page<'e, E>(
        executor: E,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskSummary>(
            r#"
            SELECT id, title, completion_status, due_date, is_public
            FROM tasks
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
    }

    /// Counts public tasks
    pub async fn count_public<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE is_public = TRUE")
            .fetch_one(executor)
            .await
    }

    /// Counts all tasks
    pub async fn count_all<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(executor)
            .await
    }

    /// Deletes a task
    ///
    /// Shares, files, comments and tags go with it (ON DELETE CASCADE).
    /// Returns whether a row was removed.
    pub async fn delete<'e, E>(executor: E, id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether `user_id` may edit this task given its share set
    ///
    /// Public tasks are open to everyone; private ones to the owner and
    /// the users they were shared with.
    pub fn is_editable_by(&self, user_id: Option<i32>, shared_with: &[i32]) -> bool {
        if self.is_public {
            return true;
        }

        match user_id {
            Some(user_id) => self.created_by == Some(user_id) || shared_with.contains(&user_id),
            None => false,
        }
    }

    /// Whether `user_id` may delete this task
    ///
    /// Orphaned tasks (owner removed) can be deleted by anyone.
    pub fn is_deletable_by(&self, user_id: Option<i32>) -> bool {
        match (self.created_by, user_id) {
            (None, _) => true,
            (Some(owner), Some(user_id)) => owner == user_id,
            (Some(_), None) => false,
        }
    }
}
