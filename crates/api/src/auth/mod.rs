pub mod backend;
pub mod jwt;
pub mod oauth;
