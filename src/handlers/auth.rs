use crate::error::ApiError;
use crate::extract::{ApiJson, expired_session_cookie, read_session_cookie, session_cookie};
use crate::handlers::users::UserResponse;
use crate::schemas::{AppState, ErrorResponse};
use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::Json,
};
use game::{auth, roster, sessions};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for registering a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    /// Password, stored as submitted
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response of register and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

type WithCookie<T> = ([(header::HeaderName, String); 1], Json<T>);

/// Close the session the client arrived with, if any. A successful register or
/// login replaces it.
async fn retire_previous_session(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if let Some(previous) = read_session_cookie(headers, &state.config.cookie_name) {
        debug!("Replacing the session the client arrived with");
        sessions::close_session(&state.db, &previous).await?;
    }
    Ok(())
}

/// Register a new user and log them in
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered, session cookie set", body = AuthResponse),
        (status = 400, description = "Username taken or empty credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, headers, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<WithCookie<AuthResponse>, ApiError> {
    trace!("Entering register handler");
    request.validate()?;

    let signed_in = auth::register(
        &state.db,
        &request.username,
        &request.password,
        state.config.session_ttl,
    )
    .await?;
    info!("User '{}' registered", signed_in.user.username);
    retire_previous_session(&state, &headers).await?;

    let cookie = session_cookie(
        &state.config.cookie_name,
        &signed_in.session.id,
        state.config.session_ttl,
    );
    let response = AuthResponse {
        message: "User registered and logged in".to_string(),
        user: UserResponse::new(signed_in.user, Vec::new()),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = AuthResponse),
        (status = 400, description = "Wrong username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, headers, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<WithCookie<AuthResponse>, ApiError> {
    trace!("Entering login handler");

    let signed_in = auth::login(
        &state.db,
        &request.username,
        &request.password,
        state.config.session_ttl,
    )
    .await?;
    retire_previous_session(&state, &headers).await?;
    let characters = roster::characters_of(&state.db, signed_in.user.id).await?;
    debug!("User '{}' owns {} characters", signed_in.user.username, characters.len());

    let cookie = session_cookie(
        &state.config.cookie_name,
        &signed_in.session.id,
        state.config.session_ttl,
    );
    let response = AuthResponse {
        message: "Logged in".to_string(),
        user: UserResponse::new(signed_in.user, characters),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

/// Log out and drop the session cookie
///
/// Succeeds without a session as well.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out, session cookie expired", body = MessageResponse),
        (status = 500, description = "Session could not be destroyed", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<WithCookie<MessageResponse>, ApiError> {
    trace!("Entering logout handler");

    match read_session_cookie(&headers, &state.config.cookie_name) {
        Some(session_id) => sessions::close_session(&state.db, &session_id).await?,
        None => debug!("Logout without a session cookie"),
    }

    let response = MessageResponse {
        message: "Logged out".to_string(),
    };
    Ok((
        [(header::SET_COOKIE, expired_session_cookie(&state.config.cookie_name))],
        Json(response),
    ))
}
