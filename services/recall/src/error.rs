//! services/recall/src/error.rs
//!
//! Defines the error types for the review client.

use crate::config::ConfigError;
use recall_core::ports::PortError;

/// Why the review controller refused a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    /// Supervision has not elapsed yet; result controls are still disabled.
    #[error("Keep reviewing, results unlock in {remaining_seconds}s")]
    GateClosed { remaining_seconds: u32 },

    /// A result for this session is already on its way to the backend.
    #[error("A review result is already being submitted")]
    SubmissionInFlight,

    /// The session has not finished loading its note.
    #[error("The review session is not active")]
    NotActive,

    /// The session was torn down or already completed.
    #[error("The review session is closed")]
    SessionClosed,

    /// Represents an error that propagated up from one of the core service ports.
    #[error(transparent)]
    Port(#[from] PortError),
}

/// The top-level error type for the `recall` client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A review session rejected the request.
    #[error("Review Error: {0}")]
    Review(#[from] ReviewError),

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
