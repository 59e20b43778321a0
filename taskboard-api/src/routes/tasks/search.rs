/// `GET /tasks/search`: relevance-ranked search
///
/// # Query Parameters
///
/// - `keyword`: matched case-insensitively against title and description
/// - `completion_status`, `is_public`: `true`/`false`/`1`/`0`
/// - `due_date`: `YYYY-MM-DD`; tasks due on or before it score higher
/// - `page`, `limit`: pagination, defaults 1 and 10
///
/// Every task is returned, ordered by score. Empty parameters count as
/// absent; malformed filter values are rejected with 400.
///
/// # Response
///
/// ```json
/// { "tasks": [{ "id": 3, "title": "...", "score": 11.5 }], "totalTasks": 12 }
/// ```

use super::form::{parse_bool, parse_date};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ErrorResponse, ValidationErrorDetail},
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use taskboard_shared::search::{Pagination, SearchFilters, SearchPage};
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Matched against title and description
    pub keyword: Option<String>,
    /// `true`/`false`/`1`/`0`
    pub completion_status: Option<String>,
    /// `true`/`false`/`1`/`0`
    pub is_public: Option<String>,
    /// `YYYY-MM-DD`
    pub due_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

/// Parses an optional value, recording a failure when it is malformed
fn decode<T>(
    errors: &mut Vec<ValidationErrorDetail>,
    field: &str,
    message: &str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = raw?;
    let parsed = parse(raw);
    if parsed.is_none() {
        errors.push(ValidationErrorDetail::new(field, message));
    }
    parsed
}

impl SearchParams {
    /// Decodes the filter parameters
    pub fn filters(&self) -> ApiResult<SearchFilters> {
        let mut errors = Vec::new();

        let completion_status = decode(
            &mut errors,
            "completion_status",
            "Completion status must be a boolean",
            present(&self.completion_status),
            parse_bool,
        );
        let is_public = decode(
            &mut errors,
            "is_public",
            "Is_public must be a boolean",
            present(&self.is_public),
            parse_bool,
        );
        let due_date = decode(
            &mut errors,
            "due_date",
            "Due date must be a valid date",
            present(&self.due_date),
            parse_date,
        );

        if !errors.is_empty() {
            return Err(ApiError::ValidationError(errors));
        }

        Ok(SearchFilters {
            keyword: self.keyword.clone().unwrap_or_default(),
            completion_status,
            is_public,
            due_date,
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::parse(self.page.as_deref(), self.limit.as_deref())
    }
}

#[utoipa::path(
    get,
    path = "/tasks/search",
    tag = "tasks",
    params(SearchParams),
    responses(
        (status = 200, description = "Every task ordered by relevance score", body = SearchPage),
        (status = 400, description = "Malformed filter value", body = ErrorResponse)
    )
)]
pub async fn search_tasks(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage>> {
    let filters = params.filters()?;
    let page = state.search.search(&filters, params.pagination()).await?;

    tracing::debug!(
        keyword = %filters.keyword,
        returned = page.tasks.len(),
        total_tasks = page.total_tasks,
        "Search completed"
    );

    Ok(Json(page))
}
