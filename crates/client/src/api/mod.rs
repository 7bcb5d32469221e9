//! Typed wrappers over the backend REST API, one unit struct per resource.
//!
//! Every wrapper validates decoded payloads with [`validator`] before
//! handing them back, so a response that parses but breaks the schema is
//! reported as a validation error instead of leaking into the UI.

pub mod auth;
pub mod comment;
pub mod dashboard;
pub mod oauth;
pub mod user;
pub mod video;

use reelgen_core::models::pagination::Paginated;
use validator::Validate;

use crate::error::ClientResult;

/// Validate a decoded payload.
pub(crate) fn validated<T: Validate>(value: T) -> ClientResult<T> {
    value.validate()?;
    Ok(value)
}

/// Validate every item of a decoded list.
pub(crate) fn validated_all<T: Validate>(items: Vec<T>) -> ClientResult<Vec<T>> {
    for item in &items {
        item.validate()?;
    }
    Ok(items)
}

pub(crate) fn validated_page<T: Validate>(page: Paginated<T>) -> ClientResult<Paginated<T>> {
    for item in &page.items {
        item.validate()?;
    }
    Ok(page)
}
