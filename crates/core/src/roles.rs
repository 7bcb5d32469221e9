//! Well-known role name constants.
//!
//! These must match the role strings issued by the backend `/auth` endpoints.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Whether the role name grants access to the admin console.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}
