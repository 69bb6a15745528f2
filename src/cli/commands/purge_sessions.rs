use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::Database;
use tracing::{debug, info, trace};

/// Delete every session whose expiry date has passed.
pub async fn purge_sessions(database_url: &str) -> Result<u64> {
    trace!("Entering purge_sessions function");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let purged = game::sessions::purge_expired(&db, Utc::now())
        .await
        .context("Failed to purge expired sessions")?;

    info!("Removed {} expired sessions", purged);
    Ok(purged)
}
