use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::config::{AppConfig, initialize_app_state_with_url};
use crate::router::create_router;

/// Apply pending migrations, then serve the API until the process stops.
pub async fn serve(database_url: &str, bind_address: &str, config: AppConfig) -> Result<()> {
    trace!("Entering serve function");
    info!("PetRust application starting up");
    debug!("Bind address: {}", bind_address);
    debug!("Configuration: {:?}", config);

    if config.admin_token.is_none() {
        info!("No admin token configured, admin endpoints are open");
    }

    trace!("Initializing application state");
    let state = match initialize_app_state_with_url(database_url, config).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    info!("Running database migrations");
    if let Err(e) = Migrator::up(&state.db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    debug!("All pending migrations have been applied");

    trace!("Creating application router");
    let app = create_router(state);

    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("PetRust API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
