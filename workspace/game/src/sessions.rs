//! Session store.
//!
//! A session row binds a random id (the cookie value) to a snapshot of the
//! user it was opened for. Rows die at `expiry_date` or on logout. Expired
//! rows are dropped when a lookup trips over them and in bulk by
//! [`purge_expired`].

use chrono::{DateTime, Duration, Utc};
use model::entities::{
    session::{self, SessionUser},
    user,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{GameError, Result};

/// Default lifetime of a session, in hours.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

pub fn default_session_ttl() -> Duration {
    Duration::hours(DEFAULT_SESSION_TTL_HOURS)
}

/// A live session resolved from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub id: String,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

/// Open a new session for `user` that lives for `ttl`.
#[instrument(skip(db, user), fields(user_id = user.id))]
pub async fn open_session(
    db: &DatabaseConnection,
    user: &user::Model,
    ttl: Duration,
) -> Result<ActiveSession> {
    trace!("Entering open_session function");

    let snapshot = SessionUser {
        id: user.id,
        username: user.username.clone(),
    };
    let data = serde_json::to_string(&snapshot)
        .map_err(|e| GameError::InternalStore(sea_orm::DbErr::Custom(e.to_string())))?;
    let expires_at = Utc::now() + ttl;

    let row = session::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user.id),
        data: Set(data),
        expiry_date: Set(expires_at.fixed_offset()),
    }
    .insert(db)
    .await?;

    info!("Opened session for user '{}' until {}", user.username, expires_at);
    Ok(ActiveSession {
        id: row.id,
        user: snapshot,
        expires_at,
    })
}

/// Look up a session id at instant `now`.
///
/// Returns `None` for unknown ids, expired rows and rows whose snapshot no
/// longer parses. Expired and unreadable rows are deleted on the way out.
#[instrument(skip(db, session_id))]
pub async fn resolve_session(
    db: &DatabaseConnection,
    session_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<ActiveSession>> {
    trace!("Entering resolve_session function");

    let Some(row) = session::Entity::find_by_id(session_id.to_string())
        .one(db)
        .await?
    else {
        debug!("No session row for presented id");
        return Ok(None);
    };

    let expires_at = row.expiry_date.with_timezone(&Utc);
    if expires_at <= now {
        debug!("Session expired at {}, removing it", expires_at);
        session::Entity::delete_by_id(row.id).exec(db).await?;
        return Ok(None);
    }

    match serde_json::from_str::<SessionUser>(&row.data) {
        Ok(user) => Ok(Some(ActiveSession {
            id: row.id,
            user,
            expires_at,
        })),
        Err(e) => {
            warn!("Discarding session with unreadable user snapshot: {}", e);
            session::Entity::delete_by_id(row.id).exec(db).await?;
            Ok(None)
        }
    }
}

/// Like [`resolve_session`] but fails with `Unauthenticated` when there is
/// no live session.
pub async fn require_session(
    db: &DatabaseConnection,
    session_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ActiveSession> {
    let Some(session_id) = session_id else {
        return Err(GameError::Unauthenticated);
    };
    resolve_session(db, session_id, now)
        .await?
        .ok_or(GameError::Unauthenticated)
}

/// Destroy a session. Closing an unknown id succeeds.
#[instrument(skip(db, session_id))]
pub async fn close_session(db: &DatabaseConnection, session_id: &str) -> Result<()> {
    trace!("Entering close_session function");

    let result = session::Entity::delete_by_id(session_id.to_string())
        .exec(db)
        .await
        .map_err(GameError::SessionDestroy)?;

    if result.rows_affected > 0 {
        info!("Session closed");
    } else {
        debug!("Session to close was already gone");
    }
    Ok(())
}

/// Delete every session that expired at or before `now`.
#[instrument(skip(db))]
pub async fn purge_expired(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<u64> {
    let result = session::Entity::delete_many()
        .filter(session::Column::ExpiryDate.lte(now.fixed_offset()))
        .exec(db)
        .await?;

    info!("Purged {} expired sessions", result.rows_affected);
    Ok(result.rows_affected)
}
