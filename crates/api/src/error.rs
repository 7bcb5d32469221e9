use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reelgen_client::ClientError;
use reelgen_core::error::{CoreError, ErrorKind};
use reelgen_render::RenderApiError;
use serde_json::json;

use crate::renders::RegistryFull;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and the upstream client errors, and
/// adds HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `reelgen_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed call to the backend API.
    #[error(transparent)]
    Backend(#[from] ClientError),

    /// A failed call to the render service.
    #[error(transparent)]
    Render(#[from] RenderApiError),

    /// No room to track another render.
    #[error(transparent)]
    RegistryFull(#[from] RegistryFull),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::from(errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Upstream errors ---
            AppError::Backend(err) => classify_backend_error(err),
            AppError::Render(err) => match err {
                RenderApiError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                other => {
                    tracing::error!(error = %other, "Render service error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR", other.to_string())
                }
            },

            AppError::RegistryFull(err) => {
                (StatusCode::SERVICE_UNAVAILABLE, "TOO_MANY_RENDERS", err.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Api { message, .. } => {
            tracing::warn!(error = %message, "Backend rejected request");
            (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR", message.clone())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
        }
    }
}

/// Classify a backend client error into an HTTP status, error code, and
/// message.
///
/// - Authentication failures map to 401.
/// - Backend 4xx validation and not-found answers keep their meaning.
/// - Everything else maps to 500 with the backend's message.
fn classify_backend_error(err: &ClientError) -> (StatusCode, &'static str, String) {
    if let ClientError::Core(core) = err {
        return classify_core_error(core);
    }
    match err.kind() {
        ErrorKind::Authentication => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            err.user_message(),
        ),
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.user_message()),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", err.user_message()),
        _ => {
            tracing::error!(error = %err, "Backend call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                err.user_message(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_unauthorized_maps_to_401() {
        let (status, code, _) = classify_backend_error(&ClientError::SessionExpired);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "UNAUTHORIZED");
    }

    #[test]
    fn backend_server_error_keeps_message() {
        let (status, _, message) = classify_backend_error(&ClientError::Http {
            status: 503,
            message: "Backend is down".into(),
            errors: vec![],
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Backend is down");
    }

    #[test]
    fn backend_validation_maps_to_400() {
        let (status, code, _) = classify_backend_error(&ClientError::Http {
            status: 422,
            message: "Email taken".into(),
            errors: vec![],
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn envelope_error_maps_to_upstream() {
        let (status, code, message) = classify_backend_error(&ClientError::Core(CoreError::Api {
            message: "Video is private".into(),
            errors: vec![],
        }));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "UPSTREAM_ERROR");
        assert_eq!(message, "Video is private");
    }

    #[test]
    fn full_registry_maps_to_503() {
        let response = AppError::from(RegistryFull(256)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
