//! Backend calls on behalf of the session holder.
//!
//! [`ClaimsSession`] adapts the backend tokens stored in a session cookie to
//! [`SessionProvider`], so requests made through [`AuthedClient`] get the
//! same refresh-once-on-401 behaviour as any other client. After the call
//! the handler inspects [`ClaimsSession::finish`] to decide whether the
//! cookie must be reissued or cleared.

use chrono::{TimeZone, Utc};
use reelgen_client::api::auth::AuthApi;
use reelgen_client::{ApiClient, AuthedClient, ClientError, ClientResult, Session, SessionProvider};
use tokio::sync::Mutex;

use super::jwt::SessionClaims;

/// What happened to the session during a backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    Unchanged,
    /// The backend tokens were refreshed; reissue the cookie.
    Refreshed(SessionClaims),
    /// The session could not be recovered; clear the cookie.
    SignedOut,
}

struct Inner {
    claims: SessionClaims,
    refreshed: bool,
    signed_out: bool,
}

pub struct ClaimsSession {
    api: ApiClient,
    inner: Mutex<Inner>,
}

impl ClaimsSession {
    pub fn new(api: ApiClient, claims: SessionClaims) -> Self {
        Self {
            api,
            inner: Mutex::new(Inner {
                claims,
                refreshed: false,
                signed_out: false,
            }),
        }
    }

    /// Wrap the session in an [`AuthedClient`] for the backend.
    pub fn client(api: ApiClient, claims: SessionClaims) -> AuthedClient<ClaimsSession> {
        AuthedClient::new(api.clone(), std::sync::Arc::new(Self::new(api, claims)))
    }

    pub async fn finish(&self) -> SessionChange {
        let inner = self.inner.lock().await;
        if inner.signed_out {
            SessionChange::SignedOut
        } else if inner.refreshed {
            SessionChange::Refreshed(inner.claims.clone())
        } else {
            SessionChange::Unchanged
        }
    }

    fn to_session(claims: &SessionClaims) -> Session {
        Session {
            user_id: claims.sub.clone(),
            role: claims.role.clone(),
            access_token: claims.backend_token.clone(),
            refresh_token: Some(claims.backend_refresh_token.clone()),
            expires_at: Utc.timestamp_opt(claims.backend_expires_at, 0).single(),
        }
    }
}

#[async_trait::async_trait]
impl SessionProvider for ClaimsSession {
    async fn session(&self) -> Option<Session> {
        let inner = self.inner.lock().await;
        (!inner.signed_out).then(|| Self::to_session(&inner.claims))
    }

    async fn refresh(&self) -> ClientResult<Session> {
        let refresh_token = {
            let inner = self.inner.lock().await;
            if inner.signed_out {
                return Err(ClientError::NoSession);
            }
            inner.claims.backend_refresh_token.clone()
        };

        let tokens = AuthApi::refresh(&self.api, &refresh_token).await?;

        let mut inner = self.inner.lock().await;
        inner.claims = inner.claims.clone().with_tokens(tokens)?;
        inner.refreshed = true;
        tracing::debug!(user_id = %inner.claims.sub, "Backend token refreshed");
        Ok(Self::to_session(&inner.claims))
    }

    async fn sign_out(&self) {
        let mut inner = self.inner.lock().await;
        inner.signed_out = true;
        tracing::info!(user_id = %inner.claims.sub, "Backend rejected session");
    }
}
