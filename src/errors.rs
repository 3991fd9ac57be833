use crate::core::permissions::Capability;
use crate::entities::user_profile::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Access denied: role {role} lacks {capability}")]
    Unauthorized { role: Role, capability: Capability },

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Unknown user: {user_id}")]
    UnknownUser { user_id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Store failures are worth re-triggering by the user; nothing else is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
