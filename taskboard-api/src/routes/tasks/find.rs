/// `GET /tasks/find?id`: one task with its attachments
///
/// # Response
///
/// ```json
/// { "task": { ... }, "files": [ ... ], "tags": [ ... ], "comments": [ ... ] }
/// ```
///
/// 400 when `id` is missing or not numeric, 404 when no such task exists.

use super::{parse_task_id, task_not_found};
use crate::{
    app::AppState,
    error::{ApiResult, ErrorResponse},
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::{comment::Comment, file::TaskFile, tag::Tag, task::Task};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindParams {
    /// Task ID
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskDetailsResponse {
    pub task: Task,
    pub files: Vec<TaskFile>,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
}

#[utoipa::path(
    get,
    path = "/tasks/find",
    tag = "tasks",
    params(FindParams),
    responses(
        (status = 200, description = "Task with files, tags and comments", body = TaskDetailsResponse),
        (status = 400, description = "Missing or non-numeric ID", body = ErrorResponse),
        (status = 404, description = "No such task", body = ErrorResponse)
    )
)]
pub async fn find_task(
    State(state): State<AppState>,
    Query(params): Query<FindParams>,
) -> ApiResult<Json<TaskDetailsResponse>> {
    let id = parse_task_id(params.id.as_deref().unwrap_or_default())?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(task_not_found)?;

    let (files, tags, comments) = tokio::try_join!(
        TaskFile::find_all_by_task_id(&state.db, id),
        Tag::find_all_by_task_id(&state.db, id),
        Comment::find_all_by_task_id(&state.db, id),
    )?;

    Ok(Json(TaskDetailsResponse {
        task,
        files,
        tags,
        comments,
    }))
}
