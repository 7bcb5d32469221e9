//! Session state for authenticated requests.
//!
//! [`SessionProvider`] is the seam between [`crate::AuthedClient`] and
//! wherever tokens live. [`TokenSession`] keeps them in memory, refreshes
//! through the backend, and announces sign-outs on a broadcast channel so
//! the embedding application can navigate to its login screen.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use reelgen_core::error::CoreError;
use reelgen_core::models::user::AuthPayload;
use reelgen_core::types::{EntityId, Timestamp};
use tokio::sync::{broadcast, RwLock};

use crate::api::auth::AuthApi;
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use crate::store::UserStore;

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Default page to send the user to after a forced sign-out.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Credentials for the backend API.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: EntityId,
    pub role: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    pub expires_at: Option<Timestamp>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// Source of the current session for [`crate::AuthedClient`].
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, if any.
    async fn session(&self) -> Option<Session>;

    /// Obtain fresh credentials after the backend rejected the current ones.
    async fn refresh(&self) -> ClientResult<Session>;

    /// Drop the session. Called when refreshing cannot recover it.
    async fn sign_out(&self);
}

/// Notifications emitted by [`TokenSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn { user_id: EntityId },
    Refreshed,
    /// The session ended; the application should navigate to `redirect_to`.
    SignedOut { redirect_to: String },
}

/// In-memory [`SessionProvider`] backed by the backend auth endpoints.
pub struct TokenSession {
    api: ApiClient,
    session: RwLock<Option<Session>>,
    user_store: UserStore,
    events: broadcast::Sender<SessionEvent>,
    login_path: String,
}

impl TokenSession {
    pub fn new(api: ApiClient, user_store: UserStore) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            session: RwLock::new(None),
            user_store,
            events,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Install the tokens from a login and publish the user.
    pub async fn establish(&self, payload: AuthPayload) -> ClientResult<()> {
        let session = Session {
            user_id: payload.user.id.clone(),
            role: payload.user.role.clone(),
            expires_at: Some(expires_at(payload.tokens.expires_in)?),
            access_token: payload.tokens.access_token,
            refresh_token: Some(payload.tokens.refresh_token),
        };
        let user_id = session.user_id.clone();
        *self.session.write().await = Some(session);
        self.user_store.set(payload.user);
        tracing::info!(%user_id, "Session established");
        let _ = self.events.send(SessionEvent::SignedIn { user_id });
        Ok(())
    }

    /// Install an existing session (e.g. restored by the host application).
    pub async fn restore(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.is_some()
    }
}

#[async_trait::async_trait]
impl SessionProvider for TokenSession {
    async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn refresh(&self) -> ClientResult<Session> {
        let current = self.session.read().await.clone();
        let Some(current) = current else {
            return Err(ClientError::NoSession);
        };
        let refresh_token = current.refresh_token.clone().ok_or(ClientError::NoSession)?;

        let tokens = AuthApi::refresh(&self.api, &refresh_token).await?;
        let refreshed = Session {
            expires_at: Some(expires_at(tokens.expires_in)?),
            access_token: tokens.access_token,
            refresh_token: Some(tokens.refresh_token),
            ..current
        };

        *self.session.write().await = Some(refreshed.clone());
        tracing::debug!(user_id = %refreshed.user_id, "Session refreshed");
        let _ = self.events.send(SessionEvent::Refreshed);
        Ok(refreshed)
    }

    async fn sign_out(&self) {
        let previous = self.session.write().await.take();
        self.user_store.clear();
        if let Some(previous) = previous {
            tracing::info!(user_id = %previous.user_id, "Signed out");
        }
        let _ = self.events.send(SessionEvent::SignedOut {
            redirect_to: self.login_path.clone(),
        });
    }
}

/// When a token issued now with the given lifetime stops being accepted.
fn expires_at(lifetime_secs: i64) -> ClientResult<Timestamp> {
    TimeDelta::try_seconds(lifetime_secs)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| {
            CoreError::Validation(format!("token lifetime {lifetime_secs}s is out of range")).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_check() {
        let mut session = Session {
            user_id: "u1".into(),
            role: "user".into(),
            access_token: "a".into(),
            refresh_token: None,
            expires_at: Some(Utc::now() - chrono::Duration::seconds(5)),
        };
        assert!(session.is_expired());

        session.expires_at = None;
        assert!(!session.is_expired());
    }

    #[test]
    fn unrepresentable_lifetime_is_a_validation_error() {
        assert!(expires_at(900).is_ok());
        assert!(matches!(
            expires_at(i64::MAX),
            Err(ClientError::Core(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn refresh_without_session_fails() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let sessions = TokenSession::new(api, UserStore::new());
        assert!(matches!(sessions.refresh().await, Err(ClientError::NoSession)));
    }

    #[tokio::test]
    async fn sign_out_clears_state_and_notifies() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let store = UserStore::new();
        let sessions = TokenSession::new(api, store.clone());
        let mut events = sessions.subscribe();

        sessions
            .restore(Session {
                user_id: "u1".into(),
                role: "user".into(),
                access_token: "a".into(),
                refresh_token: Some("r".into()),
                expires_at: None,
            })
            .await;
        assert!(sessions.is_signed_in().await);

        sessions.sign_out().await;

        assert!(!sessions.is_signed_in().await);
        assert!(store.get().is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedOut {
                redirect_to: "/login".into()
            }
        );
    }
}
