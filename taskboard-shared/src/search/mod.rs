/// Relevance-ranked task search
///
/// A search request is turned into a [`ScoringPlan`] (weighted terms built
/// from the present filters), which a [`RankedTaskSource`] evaluates over
/// every task. Results are ordered by score descending with ties broken by
/// ascending task ID, so pagination is deterministic.
///
/// Ranking decides order only. Every task is scored and returned, score 0
/// included, and the reported total is the size of the whole task set.
///
/// # Modules
///
/// - `scoring`: Predicate builder (filters to weighted terms)
/// - `pagination`: Page/limit handling with default fallback
/// - `postgres`: Ranked source running one parameterized query
/// - `memory`: Ranked source over in-memory task signals
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::search::{Pagination, PgTaskSource, SearchEngine, SearchFilters};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let engine = SearchEngine::new(PgTaskSource::new(pool));
/// let filters = SearchFilters {
///     keyword: "report".to_string(),
///     completion_status: Some(false),
///     ..Default::default()
/// };
///
/// let page = engine.search(&filters, Pagination::default()).await?;
/// for hit in &page.tasks {
///     println!("{} {}", hit.score, hit.task.title);
/// }
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod pagination;
pub mod postgres;
pub mod scoring;

pub use memory::MemoryTaskSource;
pub use pagination::Pagination;
pub use postgres::PgTaskSource;
pub use scoring::{ScoreTerm, ScoringPlan, SearchFilters, TaskSignals};

use crate::models::task::Task;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use tracing::debug;

/// Search errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A task with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ScoredTask {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub task: Task,

    pub score: f64,
}

/// One page of ranked results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchPage {
    pub tasks: Vec<ScoredTask>,

    /// Size of the whole task set, independent of scoring
    #[serde(rename = "totalTasks")]
    pub total_tasks: i64,
}

/// Store capable of scoring and ordering tasks for a plan
#[async_trait]
pub trait RankedTaskSource: Send + Sync {
    /// Tasks of one page, ordered by score descending then ID ascending
    async fn ranked_page(
        &self,
        plan: &ScoringPlan,
        pagination: Pagination,
    ) -> Result<Vec<ScoredTask>, SearchError>;

    /// Number of tasks in the store
    async fn count_tasks(&self) -> Result<i64, SearchError>;
}

/// Entry point for ranked search over a task source
#[derive(Debug, Clone)]
pub struct SearchEngine<S> {
    source: S,
}

impl<S: RankedTaskSource> SearchEngine<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scores every task against `filters` and returns the requested page
    pub async fn search(
        &self,
        filters: &SearchFilters,
        pagination: Pagination,
    ) -> Result<SearchPage, SearchError> {
        let plan = ScoringPlan::from_filters(filters);
        debug!(
            terms = plan.terms().len(),
            page = pagination.page,
            limit = pagination.limit,
            "Running ranked search"
        );

        let (tasks, total_tasks) = tokio::try_join!(
            self.source.ranked_page(&plan, pagination),
            self.source.count_tasks(),
        )?;

        Ok(SearchPage { tasks, total_tasks })
    }
}
