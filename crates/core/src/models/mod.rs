//! DTOs exchanged with the backend API.
//!
//! Response types derive [`validator::Validate`] so the request layer can
//! reject payloads that decode but violate the schema (bad URLs, empty
//! titles). Input types are validated before they are sent.

pub mod comment;
pub mod dashboard;
pub mod pagination;
pub mod render;
pub mod user;
pub mod video;
