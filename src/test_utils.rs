#[cfg(test)]
pub mod test_utils {
    use crate::config::AppConfig;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
    use std::sync::Arc;
    use tracing_subscriber::EnvFilter;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // SQLite leaves foreign keys off unless asked
        db.execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .expect("Failed to enable foreign keys");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state(config: AppConfig) -> AppState {
        AppState {
            db: setup_test_db().await,
            config: Arc::new(config),
        }
    }

    /// Route logs to the test harness, filtered by `RUST_LOG` (default `warn`).
    fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Create axum app with default configuration
    pub async fn setup_test_app() -> Router {
        setup_test_app_with_config(AppConfig::default()).await
    }

    pub async fn setup_test_app_with_config(config: AppConfig) -> Router {
        init_test_tracing();
        create_router(setup_test_app_state(config).await)
    }
}
