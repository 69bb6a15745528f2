//! Request extractors for the session gate and the admin gate.

use crate::error::ApiError;
use crate::schemas::AppState;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use game::{
    GameError,
    roster::{AdminScope, OwnerScope},
    sessions,
};
use tracing::{debug, instrument, trace, warn};

/// JSON body whose rejections come back as [`ApiError`] bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections come back as [`ApiError`] bodies.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// The user bound to the request's session cookie.
///
/// Extracting this fails with `401` when the cookie is missing, unknown or
/// expired.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

impl CurrentUser {
    /// Capability over this user's own characters.
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::new(self.id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = read_session_cookie(&parts.headers, &state.config.cookie_name);
        trace!("Session cookie present: {}", session_id.is_some());

        let session = sessions::require_session(&state.db, session_id.as_deref(), Utc::now()).await?;
        debug!("Request bound to user '{}'", session.user.username);

        Ok(CurrentUser {
            id: session.user.id,
            username: session.user.username,
        })
    }
}

/// Grants the elevated [`AdminScope`].
///
/// With no admin token configured every request is granted. Otherwise the
/// request must carry `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess(pub AdminScope);

#[async_trait]
impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_token.as_deref() else {
            return Ok(AdminAccess(AdminScope::grant()));
        };

        let presented = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match presented {
            Some(token) if token == expected => Ok(AdminAccess(AdminScope::grant())),
            Some(_) => {
                warn!("Admin request with wrong token");
                Err(ApiError(GameError::Unauthenticated))
            }
            None => {
                warn!("Admin request without token");
                Err(ApiError(GameError::Unauthenticated))
            }
        }
    }
}

/// Value of the session cookie, if any `Cookie` header carries one.
pub fn read_session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value that hands the session id to the client.
pub fn session_cookie(cookie_name: &str, session_id: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie_name,
        session_id,
        ttl.num_seconds()
    )
}

/// `Set-Cookie` value that makes the client drop the session cookie.
pub fn expired_session_cookie(cookie_name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", cookie_name)
}
