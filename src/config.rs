use crate::schemas::AppState;
use anyhow::Result;
use chrono::Duration;
use game::sessions::DEFAULT_SESSION_TTL_HOURS;
use sea_orm::Database;
use std::fmt;
use std::sync::Arc;

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "petrust.sid";

/// Runtime settings for the HTTP layer
#[derive(Clone)]
pub struct AppConfig {
    /// How long a login session lives
    pub session_ttl: Duration,
    /// Name of the cookie carrying the session id
    pub cookie_name: String,
    /// When set, admin endpoints require `Authorization: Bearer <token>`.
    /// When unset they are open.
    pub admin_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            admin_token: None,
        }
    }
}

// Hand-written so the admin token never reaches the logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("session_ttl", &self.session_ttl)
            .field("cookie_name", &self.cookie_name)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Connect to the database and build the shared application state
pub async fn initialize_app_state_with_url(database_url: &str, config: AppConfig) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    Ok(AppState {
        db,
        config: Arc::new(config),
    })
}
