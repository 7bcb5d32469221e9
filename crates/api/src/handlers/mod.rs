pub mod auth;
pub mod config;
pub mod health;
pub mod oauth;
pub mod render;
