use crate::error::ApiError;
use crate::extract::{AdminAccess, ApiPath};
use crate::handlers::characters::CharacterResponse;
use crate::schemas::{AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::{character, user};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

/// User response model. The password is never included.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    /// Characters in creation order
    pub characters: Vec<CharacterResponse>,
}

impl UserResponse {
    pub fn new(user: user::Model, characters: Vec<character::Model>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            characters: characters.into_iter().map(CharacterResponse::from).collect(),
        }
    }
}

/// Get every user with their characters
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "Users retrieved successfully", body = Vec<UserResponse>),
        (status = 401, description = "Admin token missing or wrong", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[instrument(skip(state, admin))]
pub async fn get_users(
    State(state): State<AppState>,
    AdminAccess(admin): AdminAccess,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    trace!("Entering get_users function");

    let users = admin.list_users(&state.db).await?;
    debug!("Retrieved {} users from database", users.len());

    let responses: Vec<UserResponse> = users
        .into_iter()
        .map(|(user, characters)| UserResponse::new(user, characters))
        .collect();

    info!("Successfully retrieved {} users", responses.len());
    Ok(Json(responses))
}

/// Delete a user together with their characters and sessions
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = "admin",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 401, description = "Admin token missing or wrong", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminAccess(admin): AdminAccess,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    admin.delete_user(&state.db, user_id).await?;
    info!("User with ID {} deleted", user_id);
    Ok(StatusCode::NO_CONTENT)
}
