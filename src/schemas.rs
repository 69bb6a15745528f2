use crate::config::{AppConfig, DEFAULT_COOKIE_NAME};
use crate::handlers::{
    auth::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest},
    characters::{
        ActionRequest, ActionResponse, CharacterResponse, CreateCharacterRequest,
        UpdateCharacterRequest,
    },
    users::UserResponse,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{
    Modify, OpenApi, ToSchema,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Runtime configuration
    pub config: Arc<AppConfig>,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Documents the session cookie under its default name. `--cookie-name`
/// renames it at runtime.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    DEFAULT_COOKIE_NAME,
                    "Session id set by /register and /login. The cookie name is configurable with --cookie-name.",
                ))),
            );
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::characters::create_character,
        crate::handlers::characters::get_characters,
        crate::handlers::characters::get_character,
        crate::handlers::characters::update_character,
        crate::handlers::characters::delete_character,
        crate::handlers::characters::apply_action,
        crate::handlers::admin::admin_update_character,
        crate::handlers::admin::admin_delete_character,
        crate::handlers::users::get_users,
        crate::handlers::users::delete_user,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            MessageResponse,
            UserResponse,
            CharacterResponse,
            CreateCharacterRequest,
            UpdateCharacterRequest,
            ActionRequest,
            ActionResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and logout"),
        (name = "characters", description = "Characters of the logged-in user"),
        (name = "admin", description = "Privileged endpoints that ignore ownership"),
    ),
    info(
        title = "PetRust API",
        description = "Virtual pet game API - raise characters by feeding, resting and fighting them",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
