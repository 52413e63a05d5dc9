pub mod domain;
pub mod ports;
pub mod validate;

pub use domain::{
    AiSummary, AuthToken, Category, Credentials, Note, NoteFilter, NoteInput, NoteListItem,
    Registration, ReviewOutcome, ReviewRecord, ReviewResult, ReviewSubmission, ReviewTask,
    Supervision, User, DEFAULT_SUPERVISION_SECONDS,
};
pub use ports::{Clock, KeyValueStore, NotesGateway, PortError, PortResult};
