//! Session token generation and validation.
//!
//! The app session is an HS256-signed JWT carrying [`SessionClaims`]. Besides
//! the user identity it holds the backend's own access and refresh tokens,
//! so this server can call the backend on the user's behalf without any
//! server-side session store.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use reelgen_core::error::CoreError;
use reelgen_core::models::user::{AuthPayload, AuthTokens, User};
use reelgen_core::types::EntityId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionClaims {
    /// Subject -- the backend user id.
    pub sub: EntityId,
    /// The user's role name (e.g. `"admin"`, `"user"`).
    pub role: String,
    pub email: String,
    pub name: String,
    /// Backend access token.
    pub backend_token: String,
    /// Backend refresh token.
    pub backend_refresh_token: String,
    /// When the backend access token expires (UTC Unix timestamp).
    pub backend_expires_at: i64,
    /// Expiration time of the session itself (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Configuration for session token generation and validation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign and verify session tokens.
    pub secret: String,
    /// Session lifetime in seconds; also the cookie `Max-Age`.
    pub max_age_secs: i64,
    /// Whether cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

impl SessionClaims {
    /// Claims for a freshly authenticated user.
    pub fn from_auth(payload: &AuthPayload, config: &SessionConfig) -> Result<Self, CoreError> {
        let now = Utc::now().timestamp();
        Ok(Self {
            sub: payload.user.id.clone(),
            role: payload.user.role.clone(),
            email: payload.user.email.clone(),
            name: payload.user.name.clone(),
            backend_token: payload.tokens.access_token.clone(),
            backend_refresh_token: payload.tokens.refresh_token.clone(),
            backend_expires_at: expires_at(now, payload.tokens.expires_in, "backend token")?,
            exp: expires_at(now, config.max_age_secs, "session")?,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Replace the backend tokens after a refresh. The session lifetime is
    /// not extended.
    pub fn with_tokens(mut self, tokens: AuthTokens) -> Result<Self, CoreError> {
        self.backend_expires_at =
            expires_at(Utc::now().timestamp(), tokens.expires_in, "backend token")?;
        self.backend_token = tokens.access_token;
        self.backend_refresh_token = tokens.refresh_token;
        Ok(self)
    }

    pub fn backend_token_expired(&self) -> bool {
        self.backend_expires_at <= Utc::now().timestamp()
    }

    /// Public view of the session for API responses.
    pub fn user(&self) -> SessionUser {
        SessionUser {
            id: self.sub.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

fn expires_at(now: i64, lifetime_secs: i64, what: &str) -> Result<i64, CoreError> {
    if lifetime_secs < 0 {
        return Err(CoreError::Validation(format!("{what} lifetime is negative")));
    }
    now.checked_add(lifetime_secs)
        .ok_or_else(|| CoreError::Validation(format!("{what} lifetime is out of range")))
}

/// The user identity exposed by session endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

/// Sign a session token.
pub fn encode_session(
    claims: &SessionClaims,
    config: &SessionConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(), // HS256
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a session token.
///
/// Validates the signature and the session expiry. The backend token expiry
/// is not checked here.
pub fn validate_session(
    token: &str,
    config: &SessionConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
