/// File attachments
///
/// In practice a task carries at most one file: replacing it removes the
/// previous row (and the caller removes the stored blob).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE files (
///     id SERIAL PRIMARY KEY,
///     task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     file_name VARCHAR(512) NOT NULL,
///     file_size BIGINT NOT NULL,
///     file_format VARCHAR(100) NOT NULL,
///     file_path TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use sqlx::PgExecutor;

/// MIME type of PDF attachments
pub const PDF_MIME: &str = "application/pdf";

/// MIME types accepted for upload
pub const ALLOWED_MIME_TYPES: [&str; 3] = [PDF_MIME, "image/jpeg", "image/png"];

/// Attachment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TaskFile {
    pub id: i32,
    pub task_id: i32,

    /// Name of the stored blob
    pub file_name: String,

    /// Size in bytes
    pub file_size: i64,

    /// MIME type
    pub file_format: String,

    /// Storage path of the blob
    pub file_path: String,

    pub created_at: DateTime<Utc>,
}

/// Input for recording an attachment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskFile {
    pub task_id: i32,
    pub file_name: String,
    pub file_size: i64,
    pub file_format: String,
    pub file_path: String,
}

impl TaskFile {
    /// Whether the attachment is a PDF
    pub fn is_pdf(&self) -> bool {
        self.file_format == PDF_MIME
    }

    /// Records an attachment
    pub async fn create<'e, E>(executor: E, data: &NewTaskFile) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskFile>(
            r#"
            INSERT INTO files (task_id, file_name, file_size, file_format, file_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, task_id, file_name, file_size, file_format, file_path, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(&data.file_name)
        .bind(data.file_size)
        .bind(&data.file_format)
        .bind(&data.file_path)
        .fetch_one(executor)
        .await
    }

    /// First attachment of a task
    pub async fn find_by_task_id<'e, E>(executor: E, task_id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskFile>(
            r#"
            SELECT id, task_id, file_name, file_size, file_format, file_path, created_at
            FROM files
            WHERE task_id = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(task_id)
        .fetch_optional(executor)
        .await
    }

    /// All attachments of a task
    pub async fn find_all_by_task_id<'e, E>(executor: E, task_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskFile>(
            r#"
            SELECT id, task_id, file_name, file_size, file_format, file_path, created_at
            FROM files
            WHERE task_id = $1
            ORDER BY id
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }

    /// Removes every attachment row of a task, returning the removed rows
    ///
    /// The caller owns cleanup of the blobs at `file_path`.
    pub async fn delete_for_task<'e, E>(executor: E, task_id: i32) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskFile>(
            r#"
            DELETE FROM files
            WHERE task_id = $1
            RETURNING id, task_id, file_name, file_size, file_format, file_path, created_at
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf() {
        let mut file = TaskFile {
            id: 1,
            task_id: 1,
            file_name: "2024-01-01T00-00-00-report.pdf".to_string(),
            file_size: 1024,
            file_format: PDF_MIME.to_string(),
            file_path: "uploads/report.pdf".to_string(),
            created_at: Utc::now(),
        };
        assert!(file.is_pdf());

        file.file_format = "image/png".to_string();
        assert!(!file.is_pdf());
    }

    #[test]
    fn test_allowed_mime_types() {
        assert!(ALLOWED_MIME_TYPES.contains(&"application/pdf"));
        assert!(ALLOWED_MIME_TYPES.contains(&"image/jpeg"));
        assert!(ALLOWED_MIME_TYPES.contains(&"image/png"));
        assert!(!ALLOWED_MIME_TYPES.contains(&"image/gif"));
    }
}
