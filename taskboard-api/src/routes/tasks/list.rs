/// `GET /tasks`: paginated listing
///
/// # Response
///
/// ```json
/// {
///   "tasks": [{ "id": 1, "title": "...", "completion_status": false, "due_date": "2024-03-31", "is_public": true }],
///   "totalTasks": 1
/// }
/// ```
///
/// `totalTasks` counts public tasks only while the page itself lists every
/// task by ascending ID.

use crate::{
    app::AppState,
    error::{ApiResult, ErrorResponse},
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{models::task::{Task, TaskSummary}, search::Pagination};
use utoipa::{IntoParams, ToSchema};

/// Query parameters, kept as text so bad values fall back to defaults
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskSummary>,

    #[serde(rename = "totalTasks")]
    pub total_tasks: i64,
}

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    params(ListParams),
    responses(
        (status = 200, description = "One page of tasks", body = TaskListResponse),
        (status = 500, description = "Unexpected error", body = ErrorResponse)
    )
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<TaskListResponse>> {
    let pagination = Pagination::parse(params.page.as_deref(), params.limit.as_deref());

    let (tasks, total_tasks) = tokio::try_join!(
        Task::list_page(&state.db, pagination.limit(), pagination.offset()),
        Task::count_public(&state.db),
    )?;

    tracing::debug!(
        page = pagination.page,
        returned = tasks.len(),
        total_tasks,
        "Listed tasks"
    );

    Ok(Json(TaskListResponse { tasks, total_tasks }))
}
