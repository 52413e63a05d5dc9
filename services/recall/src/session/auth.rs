//! services/recall/src/session/auth.rs
//!
//! Sign-in, registration and sign-out on top of the gateway and the
//! persistent session.

use recall_core::domain::{Credentials, Registration, User};
use recall_core::ports::{NotesGateway, PortResult};
use recall_core::validate;
use std::sync::Arc;
use tracing::info;

use crate::session::store::SessionStore;

#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<dyn NotesGateway>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn NotesGateway>, session: Arc<SessionStore>) -> Self {
        Self { gateway, session }
    }

    /// Restores a persisted session without touching the network.
    pub fn restore(&self) -> PortResult<Option<User>> {
        self.session.restore()
    }

    /// Exchanges credentials for a token and persists it with the profile.
    pub async fn login(&self, credentials: &Credentials) -> PortResult<User> {
        validate::credentials(credentials)?;

        let token = self.gateway.login(credentials).await?;
        // The login response carries no profile; the username is all we know.
        let user = User {
            id: 0,
            username: credentials.username.clone(),
            email: String::new(),
        };
        self.session.save(&token.token, &user)?;
        info!("Signed in as '{}'", user.username);
        Ok(user)
    }

    /// Creates an account. The caller still has to sign in afterwards.
    pub async fn register(&self, registration: &Registration) -> PortResult<User> {
        validate::registration(registration)?;

        let user = self.gateway.register(registration).await?;
        info!("Registered account '{}'", user.username);
        Ok(user)
    }

    pub fn logout(&self) -> PortResult<()> {
        info!("Signing out");
        self.session.clear()
    }
}
