/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    docs::{ApiDoc, OPENAPI_JSON_PATH, SWAGGER_UI_PATH},
    middleware::requester::requester_layer,
    storage::UploadStore,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::search::{PgTaskSource, SearchEngine};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Ranked search over the task table
    pub search: SearchEngine<PgTaskSource>,

    /// Attachment blob storage
    pub uploads: UploadStore,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            search: SearchEngine::new(PgTaskSource::new(db.clone())),
            uploads: UploadStore::new(config.uploads.dir.clone()),
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                  # Health check
/// ├── /tasks                       # Requester middleware (X-User-Id)
/// │   ├── GET    /                 # List
/// │   ├── POST   /                 # Create (multipart)
/// │   ├── GET    /find?id          # Details
/// │   ├── GET    /search?...       # Ranked search
/// │   ├── PUT    /:id              # Update (multipart)
/// │   └── DELETE /:id              # Delete
/// ├── /uploads/*                   # Stored attachments (read-only)
/// ├── /api-docs                    # Swagger UI
/// └── /openapi.json                # OpenAPI document
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Body size limit (attachment limit plus form overhead)
/// 4. Requester extraction (task routes)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/find", get(routes::tasks::find_task))
        .route("/search", get(routes::tasks::search_tasks))
        .route(
            "/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn(requester_layer));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                HeaderName::from_static(crate::middleware::requester::USER_ID_HEADER),
            ])
            .max_age(std::time::Duration::from_secs(3600))
    };

    let uploads = ServeDir::new(state.uploads.root());
    let body_limit = state.config.uploads.body_limit();

    Router::new()
        .merge(health_routes)
        .nest("/tasks", task_routes)
        .nest_service("/uploads", uploads)
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
