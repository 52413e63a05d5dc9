//! Client-side engine for the recall spaced-repetition notes service: the
//! backend gateway, the persistent session, the entity caches and the review
//! session controller.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod error;
pub mod review;
pub mod session;
pub mod state;

pub use error::{ClientError, ReviewError};
pub use state::AppState;
