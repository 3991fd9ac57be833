//! HTTP rendering of [`Error`].
//!
//! Permission failures are logged with the role and capability but answered with a
//! generic message. Store failures are answered as retryable.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    retryable: bool,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let (status, code, message) = match &self {
            Self::Validation { message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", message.clone())
            }
            Self::Unauthenticated | Self::UnknownUser { .. } => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Authentication required".to_string(),
            ),
            Self::Unauthorized { .. } => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Access denied".to_string(),
            ),
            Self::Conflict { message } => (StatusCode::CONFLICT, "conflict", message.clone()),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            Self::Database(err) => {
                error!("Database error: {err}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "unavailable",
                    "The database is unavailable, please try again".to_string(),
                )
            }
            Self::Config { .. } | Self::Io(_) | Self::EnvVar(_) | Self::Json(_) => {
                error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: code,
            message,
            retryable,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::permissions::Capability;
    use crate::entities::user_profile::Role;

    #[test]
    fn test_status_codes() {
        let cases = [
            (Error::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                Error::Unauthorized {
                    role: Role::Viewer,
                    capability: Capability::DeleteEvent,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                Error::Conflict {
                    message: "stale".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (Error::not_found("Event", 1), StatusCode::NOT_FOUND),
            (
                Error::Database(sea_orm::DbErr::Custom("locked".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
