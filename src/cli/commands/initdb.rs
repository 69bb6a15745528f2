use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{debug, info, trace};

/// Create or upgrade the schema by applying every pending migration.
pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;
    info!("Connected, running database migrations");

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .context("Failed to read migration status")?;
    debug!("{} pending migrations", pending.len());

    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;

    info!("Database initialization completed, {} migrations applied", pending.len());
    Ok(())
}
