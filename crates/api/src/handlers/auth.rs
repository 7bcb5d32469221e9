//! Handlers for the `/auth` resource (login, register, session, refresh,
//! logout).
//!
//! Credentials are checked by the backend; this server only wraps the
//! backend tokens in its own session cookie.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use reelgen_client::api::auth::AuthApi;
use reelgen_core::error::CoreError;
use reelgen_core::models::user::{LoginInput, RegisterInput, User};
use serde::Serialize;

use crate::auth::backend::SessionChange;
use crate::auth::jwt::{encode_session, SessionClaims, SessionUser};
use crate::cookies::{clear_cookie, set_cookie, set_cookie_headers, SESSION_COOKIE};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Session view returned by login, session and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: SessionUser,
    /// The app session token, for clients that cannot use cookies.
    pub session_token: String,
    /// Backend access token for direct backend calls.
    pub access_token: String,
    /// When `access_token` expires (UTC Unix timestamp).
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Authenticate against the backend and start a session.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Response> {
    let payload = AuthApi::login(&state.backend, &input).await?;
    let claims = SessionClaims::from_auth(&payload, &state.config.session)?;
    tracing::info!(user_id = %claims.sub, "User logged in");
    session_response(&state, claims)
}

/// POST /api/auth/register
///
/// Create an account. Does not sign the user in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = AuthApi::register(&state.backend, &input).await?;
    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// GET /api/auth/session
///
/// The current session. An expired backend token is refreshed first.
pub async fn session(State(state): State<AppState>, user: AuthUser) -> Response {
    if !user.claims.backend_token_expired() {
        let claims = user.claims;
        return session_response(&state, claims).unwrap_or_else(IntoResponse::into_response);
    }
    refresh_session(&state, user.claims).await
}

/// POST /api/auth/refresh
///
/// Force a backend token refresh. On failure the session is cleared.
pub async fn refresh(State(state): State<AppState>, user: AuthUser) -> Response {
    refresh_session(&state, user.claims).await
}

/// POST /api/auth/logout
///
/// Clear the session cookie. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = clear_cookie(SESSION_COOKIE, state.config.session.cookie_secure);
    (
        StatusCode::NO_CONTENT,
        AppendHeaders(set_cookie_headers(vec![cookie])),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn refresh_session(state: &AppState, claims: SessionClaims) -> Response {
    let refreshed = AuthApi::refresh(&state.backend, &claims.backend_refresh_token)
        .await
        .map_err(AppError::from)
        .and_then(|tokens| Ok(claims.clone().with_tokens(tokens)?));
    match refreshed {
        Ok(claims) => {
            tracing::debug!(user_id = %claims.sub, "Session refreshed");
            session_response(state, claims).unwrap_or_else(IntoResponse::into_response)
        }
        Err(e) => {
            tracing::info!(user_id = %claims.sub, error = %e, "Session refresh failed");
            signed_out(state, "Session expired")
        }
    }
}

/// `Set-Cookie` value carrying the signed session.
pub(crate) fn session_cookie(state: &AppState, claims: &SessionClaims) -> AppResult<(String, String)> {
    let token = encode_session(claims, &state.config.session)
        .map_err(|e| AppError::InternalError(format!("Session encoding error: {e}")))?;
    let cookie = set_cookie(
        SESSION_COOKIE,
        &token,
        state.config.session.max_age_secs,
        state.config.session.cookie_secure,
    );
    Ok((token, cookie))
}

/// Cookie update, if any, for a session changed during a backend call.
pub(crate) fn session_change_cookie(state: &AppState, change: SessionChange) -> Option<String> {
    match change {
        SessionChange::Unchanged => None,
        SessionChange::Refreshed(claims) => match session_cookie(state, &claims) {
            Ok((_, cookie)) => Some(cookie),
            Err(e) => {
                tracing::error!(error = %e, "Failed to reissue session");
                None
            }
        },
        SessionChange::SignedOut => Some(clear_cookie(
            SESSION_COOKIE,
            state.config.session.cookie_secure,
        )),
    }
}

/// 401 that also clears the session cookie.
pub(crate) fn signed_out(state: &AppState, message: &str) -> Response {
    let cookie = clear_cookie(SESSION_COOKIE, state.config.session.cookie_secure);
    (
        AppendHeaders(set_cookie_headers(vec![cookie])),
        AppError::Core(CoreError::Unauthorized(message.into())),
    )
        .into_response()
}

fn session_response(state: &AppState, claims: SessionClaims) -> AppResult<Response> {
    let (session_token, cookie) = session_cookie(state, &claims)?;
    let body = SessionResponse {
        user: claims.user(),
        session_token,
        access_token: claims.backend_token,
        expires_at: claims.backend_expires_at,
    };
    Ok((AppendHeaders(set_cookie_headers(vec![cookie])), Json(body)).into_response())
}
