//! crates/recall_core/src/domain.rs
//!
//! Defines the pure, core data structures for the review client.
//! These structs are independent of the wire format used by the backend.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Supervision length used when a supervised note carries no explicit duration.
pub const DEFAULT_SUPERVISION_SECONDS: u32 = 30;

// A signed-in user's cached profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// The token issued by a successful login.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSummary {
    pub summary_text: String,
    pub created_at: DateTime<Utc>,
    pub model_used: Option<String>,
}

/// The spaced-repetition state embedded in a note. Only the backend computes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub stage_number: u32,
    pub scheduled_for: NaiveDate,
}

/// Whether a note gates its reviews behind a minimum engagement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supervision {
    Unsupervised,
    Supervised { seconds: u32 },
}

impl Supervision {
    /// Builds the supervision policy from the flag/duration pair the backend stores.
    pub fn from_parts(is_supervised: bool, duration_seconds: Option<u32>) -> Self {
        if is_supervised {
            Supervision::Supervised {
                seconds: duration_seconds.unwrap_or(DEFAULT_SUPERVISION_SECONDS),
            }
        } else {
            Supervision::Unsupervised
        }
    }

    pub fn is_supervised(&self) -> bool {
        matches!(self, Supervision::Supervised { .. })
    }

    /// Seconds that must elapse before a result can be submitted.
    pub fn required_seconds(&self) -> u32 {
        match self {
            Supervision::Unsupervised => 0,
            Supervision::Supervised { seconds } => *seconds,
        }
    }
}

/// A full note, as returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub supervision: Supervision,
    pub ai_summary: Option<AiSummary>,
    pub current_review_record: Option<ReviewRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The condensed note shown in list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListItem {
    pub id: i64,
    pub title: String,
    pub is_supervised: bool,
    pub ai_summary_preview: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Note> for NoteListItem {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            is_supervised: note.supervision.is_supervised(),
            ai_summary_preview: note.ai_summary.as_ref().map(|s| s.summary_text.clone()),
            created_at: note.created_at,
        }
    }
}

/// A note due for review today. Server-computed and never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTask {
    pub note_id: i64,
    pub title: String,
    pub category_name: Option<String>,
    pub supervision: Supervision,
    pub current_review_stage: u32,
    pub ai_summary: Option<String>,
}

/// How well the user recalled a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewResult {
    /// Stage advances.
    Remembered,
    /// Stage resets.
    Fuzzy,
    /// Stage resets.
    Forgotten,
}

impl ReviewResult {
    /// The tag the backend expects on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewResult::Remembered => "REMEMBERED",
            ReviewResult::Fuzzy => "FUZZY",
            ReviewResult::Forgotten => "FORGOTTEN",
        }
    }
}

impl fmt::Display for ReviewResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REMEMBERED" => Ok(ReviewResult::Remembered),
            "FUZZY" => Ok(ReviewResult::Fuzzy),
            "FORGOTTEN" => Ok(ReviewResult::Forgotten),
            other => Err(format!("unknown review result '{}'", other)),
        }
    }
}

/// A review result ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub note_id: i64,
    pub result: ReviewResult,
    pub review_duration_seconds: u32,
}

/// The backend's answer to a submitted review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub next_review_date: NaiveDate,
}

/// Which notes a list fetch should return. The three states are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteFilter {
    #[default]
    All,
    Category(i64),
    Uncategorized,
}

/// Payload for creating or updating a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub is_supervised: bool,
    pub supervision_duration_seconds: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
}
