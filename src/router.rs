use crate::handlers::{
    admin::{admin_delete_character, admin_update_character},
    auth::{login, logout, register},
    characters::{
        apply_action, create_character, delete_character, get_character, get_characters,
        update_character,
    },
    health::health_check,
    users::{delete_user, get_users},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Session gate
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        // Characters of the logged-in user
        .route("/characters", post(create_character).get(get_characters))
        .route(
            "/characters/:character_id",
            get(get_character).put(update_character).delete(delete_character),
        )
        .route("/characters/:character_id/actions", post(apply_action))
        // Admin paths
        .route(
            "/admin/characters/:character_id",
            put(admin_update_character).delete(admin_delete_character),
        )
        .route("/admin/users", get(get_users))
        .route("/users/:user_id", delete(delete_user))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
