use crate::schemas::ErrorResponse;
use axum::{
    extract::{
        path::ErrorKind,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use game::GameError;
use tracing::{error, info, warn};

/// A [`GameError`] on its way to becoming an HTTP response
#[derive(Debug)]
pub struct ApiError(pub GameError);

impl From<GameError> for ApiError {
    fn from(error: GameError) -> Self {
        Self(error)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self(GameError::Validation(errors.to_string()))
    }
}

/// Unreadable or incomplete bodies count as failed validation.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(GameError::Validation(rejection.body_text()))
    }
}

/// Path ids that do not parse are reported as not found.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        let (key, id) = match &rejection {
            PathRejection::FailedToDeserializePathParams(e) => match e.kind() {
                ErrorKind::ParseErrorAtKey { key, value, .. } => (key.as_str(), value.clone()),
                ErrorKind::ParseError { value, .. } | ErrorKind::ParseErrorAtIndex { value, .. } => {
                    ("", value.clone())
                }
                _ => ("", e.body_text()),
            },
            other => ("", other.body_text()),
        };
        let resource = match key {
            "user_id" => "User",
            _ => "Character",
        };
        Self(GameError::NotFound { resource, id })
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            GameError::DuplicateUser { .. } => StatusCode::BAD_REQUEST,
            GameError::InvalidCredentials => StatusCode::BAD_REQUEST,
            GameError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GameError::Validation(_) => StatusCode::BAD_REQUEST,
            GameError::NotFound { .. } => StatusCode::NOT_FOUND,
            GameError::SessionDestroy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GameError::InternalStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match &self.0 {
            GameError::DuplicateUser { .. } => "DUPLICATE_USER",
            GameError::InvalidCredentials => "INVALID_CREDENTIALS",
            GameError::Unauthenticated => "UNAUTHENTICATED",
            GameError::Validation(_) => "VALIDATION_ERROR",
            GameError::NotFound { .. } => "NOT_FOUND",
            GameError::SessionDestroy(_) => "SESSION_DESTROY_ERROR",
            GameError::InternalStore(_) => "INTERNAL_STORE_ERROR",
        }
    }

    /// Message safe to show to the client. Store errors stay in the logs.
    pub fn user_message(&self) -> String {
        match &self.0 {
            GameError::SessionDestroy(_) => "Failed to log out".to_string(),
            GameError::InternalStore(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            GameError::SessionDestroy(_) | GameError::InternalStore(_) => {
                error!("Internal service error: {}", self.0);
            }
            GameError::Unauthenticated | GameError::InvalidCredentials => {
                info!("Authentication error: {}", self.0);
            }
            _ => {
                warn!("Request rejected: {}", self.0);
            }
        }

        let body = ErrorResponse {
            message: self.user_message(),
            code: self.code().to_string(),
            success: false,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                GameError::DuplicateUser {
                    username: "alice".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "DUPLICATE_USER",
            ),
            (GameError::InvalidCredentials, StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS"),
            (GameError::Unauthenticated, StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            (
                GameError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (GameError::character_not_found(3), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                GameError::SessionDestroy(sea_orm::DbErr::Custom("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "SESSION_DESTROY_ERROR",
            ),
            (
                GameError::InternalStore(sea_orm::DbErr::Custom("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_STORE_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            let api_error = ApiError::from(error);
            assert_eq!(api_error.status_code(), status);
            assert_eq!(api_error.code(), code);
        }
    }

    #[test]
    fn test_store_errors_are_not_leaked() {
        let api_error = ApiError::from(GameError::InternalStore(sea_orm::DbErr::Custom(
            "disk I/O error at /var/lib/petrust.db".to_string(),
        )));
        assert_eq!(api_error.user_message(), "Internal server error");

        let not_found = ApiError::from(GameError::character_not_found(7));
        assert_eq!(not_found.user_message(), "Character with ID 7 not found");
    }
}
