//! crates/recall_core/src/ports.rs
//!
//! Defines the service contracts (traits) the review client depends on.
//! These traits form the boundary of the hexagonal architecture: the caches and
//! the review controller only ever talk to a backend, a key-value store and a
//! clock through them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AiSummary, AuthToken, Category, Credentials, Note, NoteFilter, NoteInput, NoteListItem,
    Registration, ReviewOutcome, ReviewSubmission, ReviewTask, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy shared by every port operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The credential was missing or rejected. Persisted session state is gone.
    #[error("Unauthorized, please sign in again")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// The request conflicts with existing data, e.g. a category still in use.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Server error: {0}")]
    Server(String),
    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),
    /// Rejected locally before any request was made.
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// True when the error came from the local validators and never hit the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, PortError::Validation(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The REST backend for notes, categories, tasks and reviews.
#[async_trait]
pub trait NotesGateway: Send + Sync {
    // --- Auth ---
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthToken>;

    async fn register(&self, registration: &Registration) -> PortResult<User>;

    // --- Notes ---
    async fn list_notes(&self, filter: NoteFilter) -> PortResult<Vec<NoteListItem>>;

    async fn get_note(&self, note_id: i64) -> PortResult<Note>;

    async fn create_note(&self, input: &NoteInput) -> PortResult<Note>;

    async fn update_note(&self, note_id: i64, input: &NoteInput) -> PortResult<Note>;

    async fn delete_note(&self, note_id: i64) -> PortResult<()>;

    async fn summarize_note(&self, note_id: i64) -> PortResult<AiSummary>;

    // --- Categories ---
    async fn list_categories(&self) -> PortResult<Vec<Category>>;

    async fn create_category(&self, name: &str) -> PortResult<Category>;

    async fn update_category(&self, category_id: i64, name: &str) -> PortResult<Category>;

    /// Fails with `PortError::Conflict` while notes still reference the category.
    async fn delete_category(&self, category_id: i64) -> PortResult<()>;

    // --- Reviews ---
    async fn today_tasks(&self) -> PortResult<Vec<ReviewTask>>;

    async fn submit_review(&self, submission: &ReviewSubmission) -> PortResult<ReviewOutcome>;
}

/// Durable string storage for the handful of values that survive a restart.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove(&self, key: &str) -> PortResult<()>;
}

/// The time source for review sessions. Injectable so tests can fast-forward.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Suspends until the clock reads `deadline` or later.
    async fn sleep_until(&self, deadline: DateTime<Utc>);
}
