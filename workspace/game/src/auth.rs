//! Registration and login.
//!
//! Passwords are stored exactly as submitted and compared with plain string
//! equality, so matching is case and whitespace sensitive.

use chrono::Duration;
use model::entities::user;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{GameError, Result};
use crate::sessions::{ActiveSession, open_session};

/// A user together with the session just opened for them
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: user::Model,
    pub session: ActiveSession,
}

fn require_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() {
        return Err(GameError::Validation("username must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(GameError::Validation("password must not be empty".to_string()));
    }
    Ok(())
}

/// Create a user and open a session for them.
#[instrument(skip(db, password))]
pub async fn register(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    session_ttl: Duration,
) -> Result<SignedIn> {
    trace!("Entering register function");
    require_credentials(username, password)?;

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        warn!("Registration refused, username '{}' is taken", username);
        return Err(GameError::DuplicateUser {
            username: username.to_string(),
        });
    }

    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password.to_string()),
        ..Default::default()
    };

    // A concurrent registration can still win between the check and the insert
    let user = match new_user.insert(db).await {
        Ok(user) => user,
        Err(db_error) => {
            return Err(match db_error.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    warn!("Registration raced on username '{}'", username);
                    GameError::DuplicateUser {
                        username: username.to_string(),
                    }
                }
                _ => GameError::InternalStore(db_error),
            });
        }
    };
    info!("User registered with ID: {}, username: {}", user.id, user.username);

    let session = open_session(db, &user, session_ttl).await?;
    Ok(SignedIn { user, session })
}

/// Check credentials and open a session.
#[instrument(skip(db, password))]
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    session_ttl: Duration,
) -> Result<SignedIn> {
    trace!("Entering login function");

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::Password.eq(password))
        .one(db)
        .await?;

    let Some(user) = user else {
        debug!("No user matches the submitted credentials");
        return Err(GameError::InvalidCredentials);
    };

    info!("User '{}' logged in", user.username);
    let session = open_session(db, &user, session_ttl).await?;
    Ok(SignedIn { user, session })
}
