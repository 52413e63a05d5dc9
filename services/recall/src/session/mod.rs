pub mod auth;
pub mod store;

pub use auth::AuthService;
pub use store::{AuthStatus, SessionStore, TOKEN_KEY, USER_KEY};
