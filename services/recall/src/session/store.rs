//! services/recall/src/session/store.rs
//!
//! The persistent session: a bearer token and the cached user profile, kept in
//! durable key-value storage. The two values are written and cleared together;
//! a store holding only one of them is treated as signed out.

use recall_core::domain::User;
use recall_core::ports::{KeyValueStore, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const TOKEN_KEY: &str = "recall_token";
pub const USER_KEY: &str = "recall_user";

/// How far the client trusts its current credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    SignedOut,
    /// Restored from disk; no request has confirmed or rejected it yet.
    Provisional,
    Authenticated,
}

#[derive(Serialize, Deserialize)]
struct StoredUser {
    id: i64,
    username: String,
    #[serde(default)]
    email: String,
}

impl From<&User> for StoredUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    status: watch::Sender<AuthStatus>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (status, _) = watch::channel(AuthStatus::SignedOut);
        Self { storage, status }
    }

    /// Reads the persisted session at startup. Returns the cached profile when
    /// both values are present; anything less is cleared.
    pub fn restore(&self) -> PortResult<Option<User>> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.user()?;

        match (token, user) {
            (Some(_), Some(user)) => {
                info!("Restored session for '{}'", user.username);
                self.status.send_replace(AuthStatus::Provisional);
                Ok(Some(user))
            }
            (None, None) => Ok(None),
            _ => {
                warn!("Persisted session was incomplete, clearing it");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Persists a freshly issued credential together with its profile.
    pub fn save(&self, token: &str, user: &User) -> PortResult<()> {
        let profile = serde_json::to_string(&StoredUser::from(user))
            .map_err(|e| PortError::Storage(e.to_string()))?;

        self.storage.set(TOKEN_KEY, token)?;
        if let Err(e) = self.storage.set(USER_KEY, &profile) {
            let _ = self.storage.remove(TOKEN_KEY);
            return Err(e);
        }
        self.status.send_replace(AuthStatus::Authenticated);
        Ok(())
    }

    /// Removes both values.
    pub fn clear(&self) -> PortResult<()> {
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        self.status.send_replace(AuthStatus::SignedOut);
        token.and(user)
    }

    pub fn token(&self) -> PortResult<Option<String>> {
        self.storage.get(TOKEN_KEY)
    }

    pub fn user(&self) -> PortResult<Option<User>> {
        let Some(raw) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<StoredUser>(&raw) {
            Ok(stored) => Ok(Some(User {
                id: stored.id,
                username: stored.username,
                email: stored.email,
            })),
            Err(e) => {
                warn!("Cached user profile is unreadable: {}", e);
                Ok(None)
            }
        }
    }

    pub fn status(&self) -> AuthStatus {
        *self.status.borrow()
    }

    /// Notifies on every status change; `SignedOut` means the user must sign in again.
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    /// Called after an authenticated request succeeds.
    pub fn confirm(&self) {
        self.status.send_if_modified(|status| {
            if *status == AuthStatus::Provisional {
                *status = AuthStatus::Authenticated;
                true
            } else {
                false
            }
        });
    }

    /// Called when the backend answers 401: the credential is gone for good.
    pub fn mark_unauthorized(&self) {
        warn!("Backend rejected the credential, clearing the session");
        if let Err(e) = self.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
    }
}
