//! OAuth authorize URLs and anti-forgery state.
//!
//! Each authorization redirect carries a random `state` that is also stored
//! in an HttpOnly cookie. The callback is only honoured when the query value
//! and the cookie agree.

use uuid::Uuid;

pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_SCOPES: &str = "openid email profile";
pub const GOOGLE_CALLBACK_PATH: &str = "/api/auth/google/callback";

pub const TIKTOK_AUTHORIZE_URL: &str = "https://www.tiktok.com/v2/auth/authorize/";
pub const TIKTOK_SCOPES: &str = "user.info.basic,video.upload,video.publish";
pub const TIKTOK_CALLBACK_PATH: &str = "/api/auth/tiktok/callback";

pub const GOOGLE_STATE_COOKIE: &str = "google_oauth_state";
pub const TIKTOK_STATE_COOKIE: &str = "tiktok_oauth_state";
pub const TIKTOK_REDIRECT_COOKIE: &str = "tiktok_oauth_redirect";

/// Lifetime of the state and redirect cookies.
pub const OAUTH_COOKIE_MAX_AGE_SECS: i64 = 600;

/// Where the TikTok flow returns when no redirect was requested.
pub const DEFAULT_TIKTOK_RETURN_PATH: &str = "/profile/edit";

/// A fresh unguessable state value.
pub fn generate_state() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Whether the callback `state` matches the one stored in the cookie.
///
/// Both must be present and non-empty. Compared in constant time.
pub fn states_match(stored: Option<&str>, received: Option<&str>) -> bool {
    match (stored, received) {
        (Some(a), Some(b)) if !a.is_empty() && a.len() == b.len() => a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0,
        _ => false,
    }
}

pub fn google_authorize_url(client_id: &str, redirect_uri: &str, state: &str) -> String {
    authorize_url(
        GOOGLE_AUTHORIZE_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", GOOGLE_SCOPES),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
}

pub fn tiktok_authorize_url(client_key: &str, redirect_uri: &str, state: &str) -> String {
    authorize_url(
        TIKTOK_AUTHORIZE_URL,
        &[
            ("client_key", client_key),
            ("scope", TIKTOK_SCOPES),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("state", state),
        ],
    )
}

fn authorize_url(base: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{base}?{query}")
}

/// Accept only same-origin absolute paths as a post-login destination.
///
/// The path is stored verbatim in a cookie, so it must consist of cookie
/// octets only (no whitespace, controls, `"`, `,`, `;` or `\\`).
pub fn sanitize_return_path(path: Option<&str>) -> String {
    match path {
        Some(p) if p.starts_with('/') && !p.starts_with("//") && p.bytes().all(is_cookie_octet) => {
            p.to_string()
        }
        _ => DEFAULT_TIKTOK_RETURN_PATH.to_string(),
    }
}

fn is_cookie_octet(b: u8) -> bool {
    b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\')
}

/// Append a query parameter to an app path, keeping any existing query.
pub fn with_query_param(path: &str, key: &str, value: &str) -> String {
    let encoded: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{encoded}")
}
