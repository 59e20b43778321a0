/// Database models for Taskboard
///
/// Each model exposes plain repository functions (`create`, `find_by_id`,
/// `find_all_by_task_id`, ...) generic over `sqlx::PgExecutor`, so the same
/// call runs against the pool or inside a transaction.
///
/// # Models
///
/// - `user`: Users referenced by tasks
/// - `task`: Tasks
/// - `share`: Task share sets
/// - `file`: File attachments
/// - `comment`: Task comments
/// - `tag`: Task tags
/// - `log`: Audit log
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::{comment::Comment, task::Task};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
/// if let Some(task) = Task::find_by_id(&mut *tx, 1).await? {
///     Comment::create(&mut *tx, task.id, task.created_by, "Looks good").await?;
/// }
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod file;
pub mod log;
pub mod share;
pub mod tag;
pub mod task;
pub mod user;
