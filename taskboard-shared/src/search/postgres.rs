/// Postgres-backed ranked task source
///
/// The whole ranking runs in one statement: every task row is scored with
/// the plan's expression (share count and PDF bonus as per-task
/// subqueries), sorted, and sliced.

use super::{scoring::ScoringPlan, Pagination, RankedTaskSource, ScoredTask, SearchError};
use crate::models::task::Task;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

/// Ranked source reading the `tasks` table
#[derive(Debug, Clone)]
pub struct PgTaskSource {
    pool: PgPool,
}

impl PgTaskSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Builds the ranked page query for a plan
pub fn ranked_page_query(plan: &ScoringPlan, pagination: Pagination) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT t.id, t.title, t.description, t.completion_status, t.due_date, t.is_public, \
                t.created_by, t.responsible, t.created_at, ",
    );
    plan.push_score_expr(&mut builder);
    builder.push(" AS score FROM tasks t ORDER BY score DESC, t.id ASC LIMIT ");
    builder.push_bind(pagination.limit());
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());
    builder
}

#[async_trait]
impl RankedTaskSource for PgTaskSource {
    async fn ranked_page(
        &self,
        plan: &ScoringPlan,
        pagination: Pagination,
    ) -> Result<Vec<ScoredTask>, SearchError> {
        let mut builder = ranked_page_query(plan, pagination);
        debug!(sql = builder.sql(), "Executing ranked task query");

        let rows = builder
            .build_query_as::<ScoredTask>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count_tasks(&self) -> Result<i64, SearchError> {
        Ok(Task::count_all(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchFilters;

    #[test]
    fn test_ranked_page_query_orders_and_slices() {
        let plan = ScoringPlan::from_filters(&SearchFilters::default());
        let builder = ranked_page_query(&plan, Pagination::new(2, 5));
        let sql = builder.sql();

        assert!(sql.starts_with("SELECT t.id, t.title"));
        assert!(sql.contains("ORDER BY score DESC, t.id ASC"));
        assert!(sql.contains("LIMIT $2 OFFSET $3"));
    }
}
