/// `DELETE /tasks/:id`: delete a task
///
/// 404 when the task does not exist (nothing is logged). Only the owner may
/// delete a task; a task whose owner was removed can be deleted by anyone.
/// The log entry is written without a task reference and attachment blobs
/// are removed after commit.

use super::{parse_task_id, task_not_found};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ErrorResponse},
    middleware::requester::Requester,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::{
    file::TaskFile,
    log::{LogAction, LogEntry},
    task::Task,
};
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = i32, Path, description = "Task ID"),
        ("X-User-Id" = Option<i32>, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Task deleted", body = DeleteResponse),
        (status = 403, description = "Requester is not the owner", body = ErrorResponse),
        (status = 404, description = "No such task", body = ErrorResponse)
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = parse_task_id(&raw_id)?;

    let mut tx = state.db.begin().await?;

    let task = Task::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(task_not_found)?;

    if !task.is_deletable_by(requester.user_id) {
        return Err(ApiError::Forbidden(
            "Only the task owner can delete this task".to_string(),
        ));
    }

    let files = TaskFile::find_all_by_task_id(&mut *tx, id).await?;

    if !Task::delete(&mut *tx, id).await? {
        return Err(task_not_found());
    }
    LogEntry::record(&mut *tx, LogAction::Deleted, id, requester.user_id).await?;

    tx.commit().await?;

    for file in &files {
        state.uploads.remove(&file.file_path).await;
    }

    info!(task_id = id, user_id = ?requester.user_id, "Task deleted");

    Ok(Json(DeleteResponse {
        message: "Task deleted".to_string(),
    }))
}
