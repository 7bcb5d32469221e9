use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backend answered with a non-success envelope.
    #[error("API error: {message}")]
    Api {
        message: String,
        errors: Vec<String>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}

/// Categorical error taxonomy surfaced to users.
///
/// Only [`ErrorKind::Authentication`] is session-fatal; every other kind is
/// shown as a message and the session carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Validation,
    Authentication,
    NotFound,
    Server,
    Unknown,
}

impl ErrorKind {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 409 | 422 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }

    /// Whether this kind of error should end the session.
    pub fn forces_sign_out(self) -> bool {
        matches!(self, ErrorKind::Authentication)
    }

    /// Short message suitable for a toast.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Network => "Network error. Check your connection and try again.",
            ErrorKind::Validation => "Some of the submitted data is invalid.",
            ErrorKind::Authentication => "Your session has expired. Please sign in again.",
            ErrorKind::NotFound => "The requested resource was not found.",
            ErrorKind::Server => "The server ran into a problem. Please try again later.",
            ErrorKind::Unknown => "Something went wrong.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Unauthorized(_) => ErrorKind::Authentication,
            CoreError::Forbidden(_) => ErrorKind::Unknown,
            CoreError::Api { .. } => ErrorKind::Server,
            CoreError::Internal(_) => ErrorKind::Unknown,
        }
    }
}
