/// `POST /tasks`: create a task from a multipart form
///
/// Inserts the task, its share set, the optional comment, tag and
/// attachment, and a "Task created number N" log entry in one transaction.
/// Responds 201 with the created task.

use super::{
    add_annotations, attach_file, discard_upload,
    form::{FormKind, TaskForm, TaskFormFields, TaskSubmission},
    stage_upload,
};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ErrorResponse},
    storage::StoredFile,
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use sqlx::PgPool;
use taskboard_shared::models::{
    log::{LogAction, LogEntry},
    share::ShareWith,
    task::{NewTask, Task},
};
use tracing::info;

#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body(content = TaskFormFields, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid form fields", body = ErrorResponse)
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let submission = TaskForm::from_multipart(multipart)
        .await?
        .validate(FormKind::Create, state.config.uploads.max_file_bytes)?;

    let staged = stage_upload(&state.uploads, &submission).await?;

    match insert_task(&state.db, &submission, staged.as_ref()).await {
        Ok(task) => {
            info!(
                task_id = task.id,
                created_by = ?task.created_by,
                has_file = staged.is_some(),
                "Task created"
            );
            Ok((StatusCode::CREATED, Json(task)))
        }
        Err(err) => {
            discard_upload(&state.uploads, staged).await;
            Err(err)
        }
    }
}

async fn insert_task(
    db: &PgPool,
    submission: &TaskSubmission,
    stored: Option<&StoredFile>,
) -> ApiResult<Task> {
    let created_by = submission.created_by.ok_or_else(|| {
        ApiError::invalid_field("created_by", super::form::CREATED_BY_MESSAGE)
    })?;
    let shared_with = submission.shared_with.as_deref().unwrap_or_default();

    let mut tx = db.begin().await?;

    let task = Task::create(
        &mut *tx,
        &NewTask {
            title: submission.title.clone(),
            description: submission.description.clone(),
            completion_status: submission.completion_status,
            due_date: submission.due_date,
            is_public: submission.is_public,
            created_by,
            responsible: submission.responsible,
        },
    )
    .await?;

    ShareWith::replace_for_task(&mut tx, task.id, shared_with).await?;
    add_annotations(&mut tx, task.id, Some(created_by), submission).await?;

    if let Some(stored) = stored {
        attach_file(&mut tx, task.id, stored).await?;
    }

    LogEntry::record(&mut *tx, LogAction::Created, task.id, Some(created_by)).await?;

    tx.commit().await?;

    Ok(task)
}
