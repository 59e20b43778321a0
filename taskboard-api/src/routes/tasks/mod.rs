/// Task endpoints
///
/// # Endpoints
///
/// ```text
/// GET    /tasks?page&limit                 # Public-count listing
/// GET    /tasks/find?id                    # Task with files, tags, comments
/// GET    /tasks/search?keyword&...         # Relevance-ranked search
/// POST   /tasks                            # Create (multipart)
/// PUT    /tasks/:id                        # Update (multipart)
/// DELETE /tasks/:id                        # Delete
/// ```
///
/// Mutations run in a single transaction. Uploaded blobs are written to the
/// [`UploadStore`](crate::storage::UploadStore) before the transaction opens
/// and removed again if it fails.

pub mod create;
pub mod delete;
pub mod find;
pub mod form;
pub mod list;
pub mod search;
pub mod update;

pub use create::create_task;
pub use delete::delete_task;
pub use find::find_task;
pub use list::list_tasks;
pub use search::search_tasks;
pub use update::update_task;

use crate::{
    error::{ApiError, ApiResult},
    storage::{StoredFile, UploadStore},
};
use form::TaskSubmission;
use sqlx::PgConnection;
use taskboard_shared::models::{
    comment::Comment,
    file::{NewTaskFile, TaskFile},
    tag::Tag,
};

pub const INVALID_ID_MESSAGE: &str = "Invalid ID format";
pub const NOT_FOUND_MESSAGE: &str = "Task not found";

/// Parses a task ID from a path or query value
pub fn parse_task_id(raw: &str) -> ApiResult<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest(INVALID_ID_MESSAGE.to_string()))
}

pub(crate) fn task_not_found() -> ApiError {
    ApiError::NotFound(NOT_FOUND_MESSAGE.to_string())
}

/// Writes the submitted file, if any, ahead of the transaction
pub(crate) async fn stage_upload(
    uploads: &UploadStore,
    submission: &TaskSubmission,
) -> ApiResult<Option<StoredFile>> {
    match &submission.file {
        Some(upload) => Ok(Some(uploads.save(upload).await?)),
        None => Ok(None),
    }
}

/// Removes a staged blob after its transaction failed
pub(crate) async fn discard_upload(uploads: &UploadStore, staged: Option<StoredFile>) {
    if let Some(stored) = staged {
        uploads.remove(&stored.path).await;
    }
}

/// Appends the submitted comment and tag
pub(crate) async fn add_annotations(
    conn: &mut PgConnection,
    task_id: i32,
    author: Option<i32>,
    submission: &TaskSubmission,
) -> Result<(), sqlx::Error> {
    if let Some(comment) = &submission.comment {
        Comment::create(&mut *conn, task_id, author, comment).await?;
    }

    if let Some(tag) = &submission.tag {
        Tag::create(&mut *conn, task_id, author, tag).await?;
    }

    Ok(())
}

/// Records a stored blob as the task's attachment
pub(crate) async fn attach_file(
    conn: &mut PgConnection,
    task_id: i32,
    stored: &StoredFile,
) -> Result<TaskFile, sqlx::Error> {
    TaskFile::create(
        &mut *conn,
        &NewTaskFile {
            task_id,
            file_name: stored.file_name.clone(),
            file_size: stored.size,
            file_format: stored.content_type.clone(),
            file_path: stored.path.clone(),
        },
    )
    .await
}
