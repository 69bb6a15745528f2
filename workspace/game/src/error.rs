use thiserror::Error;

/// Failures of the session gate and the character store
#[derive(Error, Debug)]
pub enum GameError {
    /// Registration with a username that is already taken
    #[error("Username '{username}' already exists")]
    DuplicateUser { username: String },

    /// No user matches both the username and the password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The request carries no live session
    #[error("User not authenticated")]
    Unauthenticated,

    /// Request fields failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The resource does not exist or is not visible to the caller
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: &'static str, id: String },

    /// The session store failed while destroying a session
    #[error("Failed to destroy session: {0}")]
    SessionDestroy(#[source] sea_orm::DbErr),

    /// Any other store failure
    #[error("Store error: {0}")]
    InternalStore(#[from] sea_orm::DbErr),
}

impl GameError {
    pub fn character_not_found(id: i32) -> Self {
        GameError::NotFound {
            resource: "Character",
            id: id.to_string(),
        }
    }

    pub fn user_not_found(id: i32) -> Self {
        GameError::NotFound {
            resource: "User",
            id: id.to_string(),
        }
    }
}

/// Type alias for Result with GameError
pub type Result<T> = std::result::Result<T, GameError>;
