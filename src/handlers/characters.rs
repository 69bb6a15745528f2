use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::schemas::{AppState, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use game::roster::{CharacterPatch, NewCharacter};
use game::stats::{Action, ActionOutcome, Stats};
use model::entities::character;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a character
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCharacterRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    /// Image URL
    #[validate(length(min = 1, message = "image must not be empty"))]
    pub image: String,
}

/// Request body for updating a character.
///
/// Only the fields present are written; an explicit `0` counts as present.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    #[validate(range(min = 0, message = "health must not be negative"))]
    pub health: Option<i32>,
    #[validate(range(min = 0, message = "stamina must not be negative"))]
    pub stamina: Option<i32>,
    #[validate(range(min = 0, message = "energy must not be negative"))]
    pub energy: Option<i32>,
}

impl From<UpdateCharacterRequest> for CharacterPatch {
    fn from(request: UpdateCharacterRequest) -> Self {
        Self {
            name: request.name,
            image: request.image,
            health: request.health,
            stamina: request.stamina,
            energy: request.energy,
        }
    }
}

/// Character response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CharacterResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub health: i32,
    pub stamina: i32,
    pub energy: i32,
    /// True while health is zero
    pub fallen: bool,
}

impl From<character::Model> for CharacterResponse {
    fn from(model: character::Model) -> Self {
        let fallen = Stats::from(&model).is_fallen();
        Self {
            id: model.id,
            name: model.name,
            image: model.image,
            health: model.health,
            stamina: model.stamina,
            energy: model.energy,
            fallen,
        }
    }
}

/// Request body for applying an action
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ActionRequest {
    /// One of `feed`, `sleep`, `fight`
    pub action: String,
}

/// Result of an action
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    pub action: String,
    /// Change that landed on the affected stat
    pub delta: i32,
    pub fallen: bool,
    pub message: String,
    pub character: CharacterResponse,
}

fn outcome_message(name: &str, outcome: &ActionOutcome) -> String {
    match outcome.action {
        Action::Fight if outcome.fallen() && outcome.applied < 0 => {
            "Your character has fallen!".to_string()
        }
        Action::Feed => format!("{} ate and gained {} stamina", name, outcome.applied),
        Action::Sleep => format!("{} slept and gained {} energy", name, outcome.applied),
        Action::Fight if outcome.rolled > 0 => {
            format!("{} won the fight and gained {} health", name, outcome.applied)
        }
        Action::Fight => format!("{} lost the fight and lost {} health", name, -outcome.applied),
    }
}

/// Create a character for the logged-in user
#[utoipa::path(
    post,
    path = "/characters",
    tag = "characters",
    request_body = CreateCharacterRequest,
    responses(
        (status = 201, description = "Character created, full list returned", body = Vec<CharacterResponse>),
        (status = 400, description = "Empty name or image", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn create_character(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<Vec<CharacterResponse>>), ApiError> {
    trace!("Entering create_character function");
    request.validate()?;
    debug!("Creating character '{}' for user '{}'", request.name, user.username);

    let characters = user
        .scope()
        .create_character(
            &state.db,
            NewCharacter {
                name: request.name,
                image: request.image,
            },
        )
        .await?;

    info!("User '{}' now has {} characters", user.username, characters.len());
    let responses = characters.into_iter().map(CharacterResponse::from).collect();
    Ok((StatusCode::CREATED, Json(responses)))
}

/// List the logged-in user's characters
#[utoipa::path(
    get,
    path = "/characters",
    tag = "characters",
    responses(
        (status = 200, description = "Characters in creation order", body = Vec<CharacterResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_characters(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<CharacterResponse>>, ApiError> {
    trace!("Entering get_characters function");

    let characters = user.scope().list_characters(&state.db).await?;
    Ok(Json(characters.into_iter().map(CharacterResponse::from).collect()))
}

/// Get one of the logged-in user's characters
#[utoipa::path(
    get,
    path = "/characters/{character_id}",
    tag = "characters",
    params(
        ("character_id" = i32, Path, description = "Character ID"),
    ),
    responses(
        (status = 200, description = "Character retrieved successfully", body = CharacterResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_character(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(character_id): ApiPath<i32>,
) -> Result<Json<CharacterResponse>, ApiError> {
    trace!("Entering get_character function for character_id: {}", character_id);

    let character = user.scope().get_character(&state.db, character_id).await?;
    Ok(Json(CharacterResponse::from(character)))
}

/// Update one of the logged-in user's characters
#[utoipa::path(
    put,
    path = "/characters/{character_id}",
    tag = "characters",
    params(
        ("character_id" = i32, Path, description = "Character ID"),
    ),
    request_body = UpdateCharacterRequest,
    responses(
        (status = 200, description = "Character updated successfully", body = CharacterResponse),
        (status = 400, description = "Negative stat", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn update_character(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(character_id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateCharacterRequest>,
) -> Result<Json<CharacterResponse>, ApiError> {
    trace!("Entering update_character function for character_id: {}", character_id);
    request.validate()?;

    let updated = user
        .scope()
        .update_character(&state.db, character_id, request.into())
        .await?;

    info!("Character with ID {} updated", updated.id);
    Ok(Json(CharacterResponse::from(updated)))
}

/// Delete one of the logged-in user's characters
#[utoipa::path(
    delete,
    path = "/characters/{character_id}",
    tag = "characters",
    params(
        ("character_id" = i32, Path, description = "Character ID"),
    ),
    responses(
        (status = 204, description = "Character deleted successfully"),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_character(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(character_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    trace!("Entering delete_character function for character_id: {}", character_id);

    user.scope().delete_character(&state.db, character_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Feed, rest or fight a character
#[utoipa::path(
    post,
    path = "/characters/{character_id}/actions",
    tag = "characters",
    params(
        ("character_id" = i32, Path, description = "Character ID"),
    ),
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Action applied", body = ActionResponse),
        (status = 400, description = "Unknown action", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Character not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn apply_action(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(character_id): ApiPath<i32>,
    ApiJson(request): ApiJson<ActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    trace!("Entering apply_action function for character_id: {}", character_id);
    let action: Action = request.action.parse()?;

    let mut rng = StdRng::from_entropy();
    let (character, outcome) = user
        .scope()
        .apply_action(&state.db, character_id, action, &mut rng)
        .await?;

    let message = outcome_message(&character.name, &outcome);
    debug!("Action {} on character {}: {}", action, character_id, message);

    Ok(Json(ActionResponse {
        action: action.to_string(),
        delta: outcome.applied,
        fallen: outcome.fallen(),
        message,
        character: CharacterResponse::from(character),
    }))
}
