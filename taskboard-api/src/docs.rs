/// OpenAPI document for the HTTP API
///
/// Served as JSON at `/openapi.json` with Swagger UI at `/api-docs`.

use crate::{
    error::{ErrorResponse, ValidationErrorDetail},
    routes::{
        health::{self, HealthResponse},
        tasks::{
            create, delete::{self, DeleteResponse}, find::{self, TaskDetailsResponse},
            form::TaskFormFields, list::{self, TaskListResponse}, search, update,
        },
    },
};
use taskboard_shared::{
    models::{
        comment::Comment,
        file::TaskFile,
        tag::Tag,
        task::{Task, TaskSummary},
    },
    search::{ScoredTask, SearchPage},
};
use utoipa::OpenApi;

/// Path of the generated document
pub const OPENAPI_JSON_PATH: &str = "/openapi.json";

/// Mount point of the Swagger UI
pub const SWAGGER_UI_PATH: &str = "/api-docs";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskboard API",
        description = "Tasks with shares, attachments, comments, tags and relevance-ranked search"
    ),
    paths(
        health::health_check,
        list::list_tasks,
        find::find_task,
        search::search_tasks,
        create::create_task,
        update::update_task,
        delete::delete_task,
    ),
    components(schemas(
        Task,
        TaskSummary,
        TaskFile,
        Tag,
        Comment,
        ScoredTask,
        SearchPage,
        TaskListResponse,
        TaskDetailsResponse,
        DeleteResponse,
        TaskFormFields,
        HealthResponse,
        ErrorResponse,
        ValidationErrorDetail,
    )),
    tags(
        (name = "tasks", description = "Task management and search"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;
