//! Handlers for the Google sign-in and TikTok linking flows.
//!
//! Both flows store a random `state` in a short-lived HttpOnly cookie before
//! redirecting to the provider, and only exchange the returned code with the
//! backend when the callback carries the same `state`.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Json;
use reelgen_client::api::auth::AuthApi;
use reelgen_client::api::oauth::{OAuthApi, TikTokLink};
use reelgen_client::ClientResult;
use reelgen_core::error::ErrorKind;
use reelgen_core::roles::is_admin;
use serde::{Deserialize, Serialize};

use super::auth::{session_change_cookie, session_cookie};
use crate::auth::backend::ClaimsSession;
use crate::auth::jwt::SessionClaims;
use crate::auth::oauth::{
    generate_state, google_authorize_url, sanitize_return_path, states_match,
    tiktok_authorize_url, with_query_param, GOOGLE_CALLBACK_PATH, GOOGLE_STATE_COOKIE,
    OAUTH_COOKIE_MAX_AGE_SECS, TIKTOK_CALLBACK_PATH, TIKTOK_REDIRECT_COOKIE,
    TIKTOK_STATE_COOKIE,
};
use crate::cookies::{clear_cookie, read_cookie, set_cookie, set_cookie_headers};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const LOGIN_PATH: &str = "/login";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string of a provider callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Query string of `GET /api/auth/tiktok`.
#[derive(Debug, Default, Deserialize)]
pub struct TikTokStartParams {
    /// App path to return to after linking.
    pub redirect: Option<String>,
}

/// Request body for `POST /api/tiktok/link-account`.
#[derive(Debug, Deserialize)]
pub struct LinkAccountRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAccountResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok_username: Option<String>,
}

impl LinkAccountResponse {
    fn failure(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: false,
                message: message.into(),
                tiktok_username: None,
            }),
        )
    }
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

/// GET /api/auth/google
///
/// Redirect to Google's consent screen.
pub async fn google_start(State(state): State<AppState>) -> Response {
    let oauth_state = generate_state();
    let url = google_authorize_url(
        &state.config.google.client_id,
        &state.config.app_link(GOOGLE_CALLBACK_PATH),
        &oauth_state,
    );
    let cookie = set_cookie(
        GOOGLE_STATE_COOKIE,
        &oauth_state,
        OAUTH_COOKIE_MAX_AGE_SECS,
        state.config.session.cookie_secure,
    );
    redirect_with_cookies(&url, vec![cookie])
}

/// GET /api/auth/google/callback
///
/// Exchange the code with the backend and start a session. Every failure
/// lands on the login page with an `error` code.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let secure = state.config.session.cookie_secure;
    let mut cookies = vec![clear_cookie(GOOGLE_STATE_COOKIE, secure)];
    let login_error = |reason: &str| with_query_param(LOGIN_PATH, "error", reason);

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(error, description = ?params.error_description, "Google sign-in denied");
        return redirect_with_cookies(&login_error(error), cookies);
    }
    if !states_match(
        read_cookie(&headers, GOOGLE_STATE_COOKIE),
        params.state.as_deref(),
    ) {
        tracing::warn!("Google callback state mismatch");
        return redirect_with_cookies(&login_error("state_mismatch"), cookies);
    }
    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return redirect_with_cookies(&login_error("missing_code"), cookies);
    };

    let redirect_uri = state.config.app_link(GOOGLE_CALLBACK_PATH);
    let payload = match AuthApi::google(&state.backend, code, &redirect_uri).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Google code exchange failed");
            return redirect_with_cookies(&login_error("exchange_failed"), cookies);
        }
    };

    let issued = SessionClaims::from_auth(&payload, &state.config.session)
        .map_err(AppError::from)
        .and_then(|claims| Ok((session_cookie(&state, &claims)?, claims)));
    let claims = match issued {
        Ok(((_, cookie), claims)) => {
            cookies.push(cookie);
            claims
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue session");
            return redirect_with_cookies(&login_error("session_failed"), cookies);
        }
    };

    tracing::info!(user_id = %claims.sub, "User signed in with Google");
    let home = if is_admin(&claims.role) { "/admin" } else { "/" };
    redirect_with_cookies(home, cookies)
}

// ---------------------------------------------------------------------------
// TikTok
// ---------------------------------------------------------------------------

/// GET /api/auth/tiktok
///
/// Redirect a signed-in user to TikTok's consent screen.
pub async fn tiktok_start(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TikTokStartParams>,
) -> Response {
    let secure = state.config.session.cookie_secure;
    let oauth_state = generate_state();
    let return_path = sanitize_return_path(params.redirect.as_deref());
    let url = tiktok_authorize_url(
        &state.config.tiktok.client_id,
        &state.config.app_link(TIKTOK_CALLBACK_PATH),
        &oauth_state,
    );

    tracing::debug!(user_id = %user.user_id, %return_path, "Starting TikTok link");
    redirect_with_cookies(
        &url,
        vec![
            set_cookie(TIKTOK_STATE_COOKIE, &oauth_state, OAUTH_COOKIE_MAX_AGE_SECS, secure),
            set_cookie(TIKTOK_REDIRECT_COOKIE, &return_path, OAUTH_COOKIE_MAX_AGE_SECS, secure),
        ],
    )
}

/// GET /api/auth/tiktok/callback
///
/// Provider errors and a missing code go back to the app with
/// `tiktok_error`. A `state` that does not match the cookie is rejected with
/// 400 before the backend is contacted.
pub async fn tiktok_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let secure = state.config.session.cookie_secure;
    let mut cookies = vec![
        clear_cookie(TIKTOK_STATE_COOKIE, secure),
        clear_cookie(TIKTOK_REDIRECT_COOKIE, secure),
    ];
    let return_path = sanitize_return_path(read_cookie(&headers, TIKTOK_REDIRECT_COOKIE));

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(error, description = ?params.error_description, "TikTok authorization denied");
        return redirect_with_cookies(&with_query_param(&return_path, "tiktok_error", error), cookies);
    }
    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return redirect_with_cookies(
            &with_query_param(&return_path, "tiktok_error", "missing_code"),
            cookies,
        );
    };
    if !states_match(
        read_cookie(&headers, TIKTOK_STATE_COOKIE),
        params.state.as_deref(),
    ) {
        tracing::warn!("TikTok callback state mismatch");
        return AppError::BadRequest("Invalid OAuth state".into()).into_response();
    }

    let Some(user) = AuthUser::from_headers(&headers, &state.config.session) else {
        return redirect_with_cookies(
            &with_query_param(LOGIN_PATH, "callbackUrl", &return_path),
            cookies,
        );
    };

    let (result, session_update) = link_tiktok(&state, user.claims, code).await;
    cookies.extend(session_update);
    let target = match result {
        Ok(link) => {
            tracing::info!(user_id = %user.user_id, tiktok = %link.tiktok_username, "TikTok linked");
            with_query_param(&return_path, "tiktok", "linked")
        }
        Err(e) => {
            tracing::error!(user_id = %user.user_id, error = %e, "TikTok link failed");
            with_query_param(&return_path, "tiktok_error", "link_failed")
        }
    };
    redirect_with_cookies(&target, cookies)
}

/// POST /api/tiktok/link-account
///
/// JSON variant of the callback for clients that receive the code
/// themselves.
pub async fn link_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LinkAccountRequest>,
) -> Response {
    if !states_match(read_cookie(&headers, TIKTOK_STATE_COOKIE), Some(&input.state)) {
        tracing::warn!("TikTok link-account state mismatch");
        return LinkAccountResponse::failure(StatusCode::BAD_REQUEST, "Invalid OAuth state")
            .into_response();
    }
    if input.code.is_empty() {
        return LinkAccountResponse::failure(StatusCode::BAD_REQUEST, "Missing authorization code")
            .into_response();
    }
    let Some(user) = AuthUser::from_headers(&headers, &state.config.session) else {
        return LinkAccountResponse::failure(StatusCode::UNAUTHORIZED, "Not signed in")
            .into_response();
    };

    let secure = state.config.session.cookie_secure;
    let mut cookies = vec![
        clear_cookie(TIKTOK_STATE_COOKIE, secure),
        clear_cookie(TIKTOK_REDIRECT_COOKIE, secure),
    ];
    let (result, session_update) = link_tiktok(&state, user.claims, &input.code).await;
    cookies.extend(session_update);
    let cookies = AppendHeaders(set_cookie_headers(cookies));

    match result {
        Ok(link) => {
            tracing::info!(user_id = %user.user_id, tiktok = %link.tiktok_username, "TikTok linked");
            (
                cookies,
                Json(LinkAccountResponse {
                    success: true,
                    message: "TikTok account linked".into(),
                    tiktok_username: Some(link.tiktok_username),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(user_id = %user.user_id, error = %e, "TikTok link failed");
            let status = if e.kind() == ErrorKind::Authentication {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let (status, body) = LinkAccountResponse::failure(status, e.user_message());
            (status, cookies, body).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Exchange a TikTok code through the backend with the user's credentials.
///
/// Also returns the session cookie update caused by a token refresh or a
/// forced sign-out during the call.
async fn link_tiktok(
    state: &AppState,
    claims: SessionClaims,
    code: &str,
) -> (ClientResult<TikTokLink>, Option<String>) {
    let client = ClaimsSession::client(state.backend.clone(), claims);
    let redirect_uri = state.config.app_link(TIKTOK_CALLBACK_PATH);
    let result = OAuthApi::link_tiktok(&client, code, &redirect_uri).await;
    let change = client.sessions().finish().await;
    (result, session_change_cookie(state, change))
}

fn redirect_with_cookies(to: &str, cookies: Vec<String>) -> Response {
    (AppendHeaders(set_cookie_headers(cookies)), Redirect::temporary(to)).into_response()
}
