//! Page gate: session and role checks in front of the static pages.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use reelgen_core::roles::is_admin;

use super::auth::AuthUser;
use crate::auth::oauth::with_query_param;
use crate::state::AppState;

/// Pages that need any session.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/profile/edit", "/create", "/settings"];

/// Pages only for signed-out visitors.
const GUEST_ONLY: &[&str] = &["/login", "/register"];

const ADMIN_PREFIX: &str = "/admin";
const LOGIN_PATH: &str = "/login";

/// What the gate does with a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
}

/// Whether `path` is `prefix` itself or below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn login_redirect(path: &str) -> GateDecision {
    GateDecision::Redirect(with_query_param(LOGIN_PATH, "callbackUrl", path))
}

/// Decide a page request given the caller's role (`None` without session).
pub fn decide(path: &str, role: Option<&str>) -> GateDecision {
    if under(path, ADMIN_PREFIX) {
        return match role {
            None => login_redirect(path),
            Some(role) if !is_admin(role) => GateDecision::Redirect("/".into()),
            Some(_) => GateDecision::Allow,
        };
    }

    if PROTECTED_PREFIXES.iter().any(|prefix| under(path, prefix)) && role.is_none() {
        return login_redirect(path);
    }

    if GUEST_ONLY.iter().any(|page| under(path, page)) {
        if let Some(role) = role {
            let home = if is_admin(role) { ADMIN_PREFIX } else { "/" };
            return GateDecision::Redirect(home.into());
        }
    }

    GateDecision::Allow
}

/// Middleware applied to the page service.
pub async fn page_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let user = AuthUser::from_headers(request.headers(), &state.config.session);
    let path = request.uri().path().to_string();

    match decide(&path, user.as_ref().map(|u| u.role.as_str())) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(to) => {
            tracing::debug!(%path, %to, "Page gate redirect");
            Redirect::temporary(&to).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(to: &str) -> GateDecision {
        GateDecision::Redirect(to.into())
    }

    #[test]
    fn admin_pages() {
        assert_eq!(decide("/admin", None), redirect("/login?callbackUrl=%2Fadmin"));
        assert_eq!(decide("/admin/users", Some("user")), redirect("/"));
        assert_eq!(decide("/admin/users", Some("admin")), GateDecision::Allow);
    }

    #[test]
    fn protected_pages_need_session() {
        assert_eq!(
            decide("/dashboard/videos", None),
            redirect("/login?callbackUrl=%2Fdashboard%2Fvideos")
        );
        assert_eq!(decide("/profile/edit", None), redirect("/login?callbackUrl=%2Fprofile%2Fedit"));
        assert_eq!(decide("/create", Some("user")), GateDecision::Allow);
        assert_eq!(decide("/settings", Some("admin")), GateDecision::Allow);
    }

    #[test]
    fn prefixes_match_whole_segments() {
        assert_eq!(decide("/administrators", None), GateDecision::Allow);
        assert_eq!(decide("/created-videos", None), GateDecision::Allow);
        assert_eq!(decide("/profile/ana", None), GateDecision::Allow);
    }

    #[test]
    fn guest_pages_bounce_signed_in_users() {
        assert_eq!(decide("/login", None), GateDecision::Allow);
        assert_eq!(decide("/login", Some("user")), redirect("/"));
        assert_eq!(decide("/register", Some("admin")), redirect("/admin"));
    }

    #[test]
    fn public_pages_pass() {
        assert_eq!(decide("/", None), GateDecision::Allow);
        assert_eq!(decide("/video/v1", None), GateDecision::Allow);
    }
}
