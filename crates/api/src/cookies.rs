//! Minimal cookie helpers over raw `Cookie` / `Set-Cookie` headers.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "reelgen_session";

/// Read a cookie value from the request headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// `Set-Cookie` value for an HttpOnly, `SameSite=Lax` cookie scoped to `/`.
pub fn set_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that deletes the cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}

/// Headers for `AppendHeaders`, one `Set-Cookie` per entry.
pub fn set_cookie_headers(cookies: Vec<String>) -> Vec<(HeaderName, String)> {
    cookies.into_iter().map(|c| (SET_COOKIE, c)).collect()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_named_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("a=1; tiktok_oauth_state=xyz; b=2"));
        assert_eq!(read_cookie(&headers, "tiktok_oauth_state"), Some("xyz"));
        assert_eq!(read_cookie(&headers, "b"), Some("2"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn reads_across_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("reelgen_session=tok"));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("tok"));
    }

    #[test]
    fn set_cookie_attributes() {
        assert_eq!(
            set_cookie("s", "v", 600, false),
            "s=v; Path=/; Max-Age=600; HttpOnly; SameSite=Lax"
        );
        assert!(set_cookie("s", "v", 600, true).ends_with("; Secure"));
        assert!(clear_cookie("s", false).starts_with("s=; Path=/; Max-Age=0"));
    }
}
