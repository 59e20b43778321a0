/// `PUT /tasks/:id`: replace a task's fields from a multipart form
///
/// The requester (`X-User-Id`) may edit a task that is public, that they
/// own, or that is shared with them; anyone else gets 403.
///
/// - `sharedWith` replaces the share set when present and keeps it otherwise.
/// - `responsible` must belong to the resulting share set. A stored
///   responsible user that is no longer shared with is cleared.
/// - A new `taskFile` replaces the current attachment; the old blob is
///   removed after commit.
/// - Comments and tags are appended under the requester.

use super::{
    add_annotations, attach_file, discard_upload,
    form::{FormKind, TaskForm, TaskFormFields, TaskSubmission},
    parse_task_id, stage_upload, task_not_found,
};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ErrorResponse},
    middleware::requester::Requester,
    storage::StoredFile,
};
use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use sqlx::PgPool;
use taskboard_shared::models::{
    file::TaskFile,
    log::{LogAction, LogEntry},
    share::ShareWith,
    task::{Task, TaskChanges},
};
use tracing::info;

#[utoipa::path(
    put,
    path = "/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = i32, Path, description = "Task ID"),
        ("X-User-Id" = Option<i32>, Header, description = "Acting user")
    ),
    request_body(content = TaskFormFields, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Invalid form fields", body = ErrorResponse),
        (status = 403, description = "Requester may not edit this task", body = ErrorResponse),
        (status = 404, description = "No such task", body = ErrorResponse)
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&raw_id)?;
    let submission = TaskForm::from_multipart(multipart)
        .await?
        .validate(FormKind::Update, state.config.uploads.max_file_bytes)?;

    let staged = stage_upload(&state.uploads, &submission).await?;

    match apply_update(&state.db, id, requester, &submission, staged.as_ref()).await {
        Ok((task, replaced)) => {
            for file in &replaced {
                state.uploads.remove(&file.file_path).await;
            }

            info!(
                task_id = task.id,
                user_id = ?requester.user_id,
                replaced_files = replaced.len(),
                "Task updated"
            );
            Ok(Json(task))
        }
        Err(err) => {
            discard_upload(&state.uploads, staged).await;
            Err(err)
        }
    }
}

/// Responsible user after an update
///
/// An explicit value wins; otherwise the stored one is kept while it is
/// still shared with.
fn effective_responsible(
    requested: Option<i32>,
    current: Option<i32>,
    shared_with: &[i32],
) -> Option<i32> {
    requested
        .or(current)
        .filter(|user_id| shared_with.contains(user_id))
}

/// Applies the update and returns the task with any replaced file rows
async fn apply_update(
    db: &PgPool,
    id: i32,
    requester: Requester,
    submission: &TaskSubmission,
    stored: Option<&StoredFile>,
) -> ApiResult<(Task, Vec<TaskFile>)> {
    let mut tx = db.begin().await?;

    let current = Task::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(task_not_found)?;
    let current_shares = ShareWith::list_user_ids(&mut *tx, id).await?;

    if !current.is_editable_by(requester.user_id, &current_shares) {
        return Err(ApiError::Forbidden(
            "You do not have permission to edit this task".to_string(),
        ));
    }

    let shared_with = match &submission.shared_with {
        Some(user_ids) => {
            ShareWith::replace_for_task(&mut tx, id, user_ids).await?;
            user_ids.clone()
        }
        None => current_shares,
    };
    submission.check_responsible(&shared_with)?;

    let task = Task::update(
        &mut *tx,
        id,
        &TaskChanges {
            title: submission.title.clone(),
            description: submission.description.clone(),
            completion_status: submission.completion_status,
            due_date: submission.due_date,
            is_public: submission.is_public,
            responsible: effective_responsible(
                submission.responsible,
                current.responsible,
                &shared_with,
            ),
        },
    )
    .await?
    .ok_or_else(task_not_found)?;

    add_annotations(&mut tx, id, requester.user_id, submission).await?;

    let replaced = match stored {
        Some(stored) => {
            let replaced = TaskFile::delete_for_task(&mut *tx, id).await?;
            attach_file(&mut tx, id, stored).await?;
            replaced
        }
        None => Vec::new(),
    };

    LogEntry::record(&mut *tx, LogAction::Updated, id, requester.user_id).await?;

    tx.commit().await?;

    Ok((task, replaced))
}
