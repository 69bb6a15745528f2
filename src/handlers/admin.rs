//! Character edits that skip the ownership check.

use crate::error::ApiError;
use crate::extract::{AdminAccess, ApiJson, ApiPath};
use crate::handlers::characters::{CharacterResponse, UpdateCharacterRequest};
use crate::schemas::{AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{info, instrument, trace};
use validator::Validate;

/// Update any user's character
#[utoipa::path(
    put,
    path = "/admin/characters/{character_id}",
    tag = "admin",
    params(
        ("character_id" = i32, Path, description = "Character ID"),
    ),
    request_body = UpdateCharacterRequest,
    responses(
        (status = 200, description = "Character updated successfully", body = CharacterResponse),
        (status = 400, description = "Negative stat", body = ErrorResponse),
        (status = 401, description = "Admin token missing or wrong", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[instrument(skip(state, admin))]
pub async fn admin_update_character(
    State(state): State<AppState>,
    AdminAccess(admin): AdminAccess,
    ApiPath(character_id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateCharacterRequest>,
) -> Result<Json<CharacterResponse>, ApiError> {
    trace!("Entering admin_update_character function for character_id: {}", character_id);
    request.validate()?;

    let updated = admin
        .update_character(&state.db, character_id, request.into())
        .await?;

    info!("Admin updated character with ID {}", updated.id);
    Ok(Json(CharacterResponse::from(updated)))
}

/// Delete any user's character
#[utoipa::path(
    delete,
    path = "/admin/characters/{character_id}",
    tag = "admin",
    params(
        ("character_id" = i32, Path, description = "Character ID"),
    ),
    responses(
        (status = 204, description = "Character deleted successfully"),
        (status = 401, description = "Admin token missing or wrong", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("admin_token" = []))
)]
#[instrument(skip(state, admin))]
pub async fn admin_delete_character(
    State(state): State<AppState>,
    AdminAccess(admin): AdminAccess,
    ApiPath(character_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    trace!("Entering admin_delete_character function for character_id: {}", character_id);

    admin.delete_character(&state.db, character_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
