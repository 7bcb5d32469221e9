//! Session extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use reelgen_core::error::CoreError;
use reelgen_core::types::EntityId;

use crate::auth::jwt::{validate_session, SessionClaims, SessionConfig};
use crate::cookies::{read_cookie, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the session token.
///
/// The token is taken from an `Authorization: Bearer` header when present,
/// otherwise from the `reelgen_session` cookie.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The backend user id (from `claims.sub`).
    pub user_id: EntityId,
    /// The user's role name (e.g. `"admin"`, `"user"`).
    pub role: String,
    /// Full session claims, including the backend tokens.
    pub claims: SessionClaims,
}

impl AuthUser {
    /// Resolve the session from request headers without rejecting.
    pub fn from_headers(headers: &HeaderMap, config: &SessionConfig) -> Option<Self> {
        let token = session_token(headers)?;
        let claims = validate_session(token, config).ok()?;
        Some(Self::from(claims))
    }
}

impl From<SessionClaims> for AuthUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            role: claims.role.clone(),
            claims,
        }
    }
}

/// The raw session token from the bearer header or the session cookie.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer.or_else(|| read_cookie(headers, SESSION_COOKIE))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Not signed in".into())))?;

        let claims = validate_session(token, &state.config.session).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired session".into()))
        })?;

        Ok(AuthUser::from(claims))
    }
}
