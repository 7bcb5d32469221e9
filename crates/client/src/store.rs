//! Minimal client-side stores.
//!
//! Each store is a single [`tokio::sync::watch`] slot: setters replace the
//! value, readers take a snapshot or subscribe to changes. No derived state
//! and no persistence.

use std::sync::Arc;

use reelgen_core::models::user::User;
use tokio::sync::watch;

/// The signed-in user.
#[derive(Clone)]
pub struct UserStore {
    tx: Arc<watch::Sender<Option<User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, user: User) {
        self.tx.send_replace(Some(user));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn get(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The feed search query.
#[derive(Clone)]
pub struct SearchStore {
    tx: Arc<watch::Sender<String>>,
}

impl SearchStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(String::new());
        Self { tx: Arc::new(tx) }
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.tx.send_replace(query.into());
    }

    pub fn clear(&self) {
        self.tx.send_replace(String::new());
    }

    pub fn query(&self) -> String {
        self.tx.borrow().clone()
    }

    /// The query as a feed filter: `None` when blank.
    pub fn as_filter(&self) -> Option<String> {
        let query = self.tx.borrow();
        let trimmed = query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for SearchStore {
    fn default() -> Self {
        Self::new()
    }
}
