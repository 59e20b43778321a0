/// In-memory ranked task source
///
/// Evaluates the scoring plan directly over task signals. Ranking follows
/// the same order as the Postgres source: score descending, then task ID
/// ascending.

use super::{scoring::ScoringPlan, Pagination, RankedTaskSource, ScoredTask, SearchError, TaskSignals};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Ranked source holding tasks in memory, keyed by task ID
#[derive(Debug, Default)]
pub struct MemoryTaskSource {
    tasks: RwLock<BTreeMap<i32, TaskSignals>>,
}

impl MemoryTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a task
    pub fn upsert(&self, signals: TaskSignals) {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        tasks.insert(signals.task.id, signals);
    }

    /// Removes a task, returning its signals
    pub fn remove(&self, task_id: i32) -> Option<TaskSignals> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        tasks.remove(&task_id)
    }

    /// Applies `update` to a stored task; returns false if it is unknown
    pub fn modify(&self, task_id: i32, update: impl FnOnce(&mut TaskSignals)) -> bool {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        match tasks.get_mut(&task_id) {
            Some(signals) => {
                update(signals);
                true
            }
            None => false,
        }
    }

    /// Scores and orders every stored task
    pub fn rank_all(&self, plan: &ScoringPlan) -> Vec<ScoredTask> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);

        let mut ranked: Vec<ScoredTask> = tasks
            .values()
            .map(|signals| ScoredTask {
                task: signals.task.clone(),
                score: plan.score(signals),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.task.id.cmp(&b.task.id))
        });
        ranked
    }
}

impl FromIterator<TaskSignals> for MemoryTaskSource {
    fn from_iter<I: IntoIterator<Item = TaskSignals>>(iter: I) -> Self {
        let tasks = iter
            .into_iter()
            .map(|signals| (signals.task.id, signals))
            .collect();

        Self {
            tasks: RwLock::new(tasks),
        }
    }
}

#[async_trait]
impl RankedTaskSource for MemoryTaskSource {
    async fn ranked_page(
        &self,
        plan: &ScoringPlan,
        pagination: Pagination,
    ) -> Result<Vec<ScoredTask>, SearchError> {
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);

        Ok(self
            .rank_all(plan)
            .into_iter()
            .skip(offset)
            .take(pagination.limit as usize)
            .collect())
    }

    async fn count_tasks(&self) -> Result<i64, SearchError> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks.len() as i64)
    }
}
