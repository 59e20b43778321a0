/// Database layer for Taskboard
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Schema migrations embedded from the workspace `migrations/` directory
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, PoolSettings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = PoolSettings::new(std::env::var("DATABASE_URL")?);
///     let pool = create_pool(&settings).await?;
///     taskboard_shared::db::migrations::run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
