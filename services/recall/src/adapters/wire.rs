//! services/recall/src/adapters/wire.rs
//!
//! JSON shapes exchanged with the backend. Every response arrives wrapped in an
//! `{code, message, data}` envelope; the record structs below are converted into
//! pure domain types before they leave the adapter.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use recall_core::domain::{
    AiSummary, AuthToken, Category, Note, NoteInput, NoteListItem, ReviewOutcome, ReviewRecord,
    ReviewSubmission, ReviewTask, Supervision, User,
};
use recall_core::ports::{PortError, PortResult};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Envelope
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

//=========================================================================================
// Timestamps
//=========================================================================================

/// The backend emits timestamps either as epoch milliseconds or as ISO-8601 text,
/// with or without an offset.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(i64),
    Text(String),
}

impl WireTimestamp {
    pub fn to_utc(&self) -> PortResult<DateTime<Utc>> {
        match self {
            WireTimestamp::Millis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .ok_or_else(|| PortError::Unexpected(format!("timestamp {} out of range", ms))),
            WireTimestamp::Text(text) => parse_timestamp(text),
        }
    }
}

fn parse_timestamp(text: &str) -> PortResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(PortError::Unexpected(format!("unrecognised timestamp '{}'", text)))
}

fn optional_timestamp(value: Option<WireTimestamp>) -> PortResult<Option<DateTime<Utc>>> {
    value.map(|ts| ts.to_utc()).transpose()
}

//=========================================================================================
// Response Records
//=========================================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: i64,
}
impl LoginRecord {
    pub fn to_domain(self) -> AuthToken {
        AuthToken {
            token: self.token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in: self.expires_in,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserRecord {
    id: i64,
    username: String,
    #[serde(default)]
    email: Option<String>,
}
impl UserRecord {
    pub fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    id: i64,
    name: String,
    created_at: WireTimestamp,
}
impl CategoryRecord {
    pub fn to_domain(self) -> PortResult<Category> {
        Ok(Category {
            id: self.id,
            name: self.name,
            created_at: self.created_at.to_utc()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummaryRecord {
    summary_text: String,
    created_at: WireTimestamp,
    #[serde(default)]
    model_used: Option<String>,
}
impl AiSummaryRecord {
    pub fn to_domain(self) -> PortResult<AiSummary> {
        Ok(AiSummary {
            summary_text: self.summary_text,
            created_at: self.created_at.to_utc()?,
            model_used: self.model_used,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecordRecord {
    stage_number: u32,
    scheduled_for: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    id: i64,
    title: String,
    content: String,
    #[serde(default)]
    category_id: Option<i64>,
    #[serde(default)]
    category_name: Option<String>,
    #[serde(default)]
    is_supervised: bool,
    #[serde(default)]
    supervision_duration_seconds: Option<u32>,
    #[serde(default)]
    ai_summary: Option<AiSummaryRecord>,
    #[serde(default)]
    current_review_record: Option<ReviewRecordRecord>,
    created_at: WireTimestamp,
    #[serde(default)]
    updated_at: Option<WireTimestamp>,
}
impl NoteRecord {
    pub fn to_domain(self) -> PortResult<Note> {
        Ok(Note {
            id: self.id,
            title: self.title,
            content: self.content,
            category_id: self.category_id,
            category_name: self.category_name,
            supervision: Supervision::from_parts(
                self.is_supervised,
                self.supervision_duration_seconds,
            ),
            ai_summary: self.ai_summary.map(|s| s.to_domain()).transpose()?,
            current_review_record: self.current_review_record.map(|r| ReviewRecord {
                stage_number: r.stage_number,
                scheduled_for: r.scheduled_for,
            }),
            created_at: self.created_at.to_utc()?,
            updated_at: optional_timestamp(self.updated_at)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteListItemRecord {
    id: i64,
    title: String,
    #[serde(default)]
    is_supervised: bool,
    #[serde(default)]
    ai_summary_preview: Option<String>,
    created_at: WireTimestamp,
}
impl NoteListItemRecord {
    pub fn to_domain(self) -> PortResult<NoteListItem> {
        Ok(NoteListItem {
            id: self.id,
            title: self.title,
            is_supervised: self.is_supervised,
            ai_summary_preview: self.ai_summary_preview,
            created_at: self.created_at.to_utc()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    note_id: i64,
    title: String,
    #[serde(default)]
    category_name: Option<String>,
    #[serde(default)]
    is_supervised: bool,
    #[serde(default)]
    supervision_duration_seconds: Option<u32>,
    current_review_stage: u32,
    #[serde(default)]
    ai_summary: Option<String>,
}
impl TaskRecord {
    pub fn to_domain(self) -> ReviewTask {
        ReviewTask {
            note_id: self.note_id,
            title: self.title,
            category_name: self.category_name,
            supervision: Supervision::from_parts(
                self.is_supervised,
                self.supervision_duration_seconds,
            ),
            current_review_stage: self.current_review_stage,
            ai_summary: self.ai_summary,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcomeRecord {
    next_review_date: NaiveDate,
}
impl ReviewOutcomeRecord {
    pub fn to_domain(self) -> ReviewOutcome {
        ReviewOutcome {
            next_review_date: self.next_review_date,
        }
    }
}

//=========================================================================================
// Request Bodies
//=========================================================================================

#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteBody<'a> {
    title: &'a str,
    content: &'a str,
    category_id: Option<i64>,
    is_supervised: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    supervision_duration_seconds: Option<u32>,
}
impl<'a> From<&'a NoteInput> for NoteBody<'a> {
    fn from(input: &'a NoteInput) -> Self {
        Self {
            title: &input.title,
            content: &input.content,
            category_id: input.category_id,
            is_supervised: input.is_supervised,
            supervision_duration_seconds: if input.is_supervised {
                input.supervision_duration_seconds
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeBody {
    pub note_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewBody {
    note_id: i64,
    result: &'static str,
    review_duration_seconds: u32,
}
impl From<&ReviewSubmission> for SubmitReviewBody {
    fn from(submission: &ReviewSubmission) -> Self {
        Self {
            note_id: submission.note_id,
            result: submission.result.as_str(),
            review_duration_seconds: submission.review_duration_seconds,
        }
    }
}
