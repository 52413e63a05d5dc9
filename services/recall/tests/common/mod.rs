//! An in-memory stand-in for the notes backend, plus a harness that wires it
//! into a full `AppState` driven by a manual clock.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use recall_core::domain::{
    AiSummary, AuthToken, Category, Credentials, Note, NoteFilter, NoteInput, NoteListItem,
    Registration, ReviewOutcome, ReviewRecord, ReviewResult, ReviewSubmission, ReviewTask,
    Supervision, User,
};
use recall_core::ports::{NotesGateway, PortError, PortResult};
use recall_lib::adapters::{ManualClock, MemoryStore};
use recall_lib::session::SessionStore;
use recall_lib::state::AppState;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};

pub fn next_review_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
}

#[derive(Default)]
struct Backend {
    notes: BTreeMap<i64, Note>,
    categories: BTreeMap<i64, Category>,
    due: BTreeSet<i64>,
    next_id: i64,
    submissions: Vec<ReviewSubmission>,
    calls: usize,
    fail_next: Option<PortError>,
}

#[derive(Default)]
pub struct FakeGateway {
    inner: Mutex<Backend>,
    hold: Mutex<Option<Arc<Notify>>>,
    load_holds: Mutex<HashMap<i64, Arc<Notify>>>,
    parked_loads: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_note(&self, id: i64, title: &str, supervision: Supervision, category_id: Option<i64>) {
        let mut backend = self.inner.lock().unwrap();
        let (is_supervised, seconds) = match supervision {
            Supervision::Unsupervised => (false, None),
            Supervision::Supervised { seconds } => (true, Some(seconds)),
        };
        let note = build_note(id, title, is_supervised, seconds, category_id);
        backend.notes.insert(id, note);
        backend.next_id = backend.next_id.max(id);
    }

    pub fn add_category(&self, id: i64, name: &str) {
        let mut backend = self.inner.lock().unwrap();
        backend.categories.insert(
            id,
            Category {
                id,
                name: name.to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
        );
        backend.next_id = backend.next_id.max(id);
    }

    pub fn mark_due(&self, note_id: i64) {
        let mut backend = self.inner.lock().unwrap();
        backend.due.insert(note_id);
        if let Some(note) = backend.notes.get_mut(&note_id) {
            note.current_review_record.get_or_insert(ReviewRecord {
                stage_number: 1,
                scheduled_for: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            });
        }
    }

    /// Changes a stored note's supervision as if edited from another screen.
    pub fn set_supervision(&self, note_id: i64, seconds: u32) {
        let mut backend = self.inner.lock().unwrap();
        if let Some(note) = backend.notes.get_mut(&note_id) {
            note.supervision = Supervision::Supervised { seconds };
        }
    }

    pub fn fail_next(&self, error: PortError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }

    /// Parks every submission until the returned handle is notified.
    pub fn hold_submissions(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    /// Parks detail loads of `note_id` until the returned handle is notified.
    pub fn hold_load(&self, note_id: i64) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.load_holds
            .lock()
            .unwrap()
            .insert(note_id, notify.clone());
        notify
    }

    /// How many detail loads have reached a held note.
    pub fn parked_loads(&self) -> usize {
        self.parked_loads.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<ReviewSubmission> {
        self.inner.lock().unwrap().submissions.clone()
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    pub fn note(&self, note_id: i64) -> Option<Note> {
        self.inner.lock().unwrap().notes.get(&note_id).cloned()
    }

    fn enter(&self) -> PortResult<std::sync::MutexGuard<'_, Backend>> {
        let mut backend = self.inner.lock().unwrap();
        backend.calls += 1;
        match backend.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(backend),
        }
    }
}

fn build_note(
    id: i64,
    title: &str,
    is_supervised: bool,
    seconds: Option<u32>,
    category_id: Option<i64>,
) -> Note {
    Note {
        id,
        title: title.to_string(),
        content: format!("content of {}", title),
        category_id,
        category_name: None,
        supervision: Supervision::from_parts(is_supervised, seconds),
        ai_summary: None,
        current_review_record: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: None,
    }
}

#[async_trait]
impl NotesGateway for FakeGateway {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthToken> {
        let _backend = self.enter()?;
        Ok(AuthToken {
            token: format!("token-for-{}", credentials.username),
            token_type: "Bearer".into(),
            expires_in: 86_400,
        })
    }

    async fn register(&self, registration: &Registration) -> PortResult<User> {
        let mut backend = self.enter()?;
        backend.next_id += 1;
        Ok(User {
            id: backend.next_id,
            username: registration.username.clone(),
            email: registration.email.clone(),
        })
    }

    async fn list_notes(&self, filter: NoteFilter) -> PortResult<Vec<NoteListItem>> {
        let backend = self.enter()?;
        Ok(backend
            .notes
            .values()
            .filter(|note| match filter {
                NoteFilter::All => true,
                NoteFilter::Category(id) => note.category_id == Some(id),
                NoteFilter::Uncategorized => note.category_id.is_none(),
            })
            .map(NoteListItem::from)
            .collect())
    }

    async fn get_note(&self, note_id: i64) -> PortResult<Note> {
        let hold = self.load_holds.lock().unwrap().get(&note_id).cloned();
        if let Some(hold) = hold {
            self.parked_loads.fetch_add(1, Ordering::SeqCst);
            hold.notified().await;
        }

        let backend = self.enter()?;
        backend
            .notes
            .get(&note_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Note not found".into()))
    }

    async fn create_note(&self, input: &NoteInput) -> PortResult<Note> {
        let mut backend = self.enter()?;
        backend.next_id += 1;
        let id = backend.next_id;
        let mut note = build_note(
            id,
            &input.title,
            input.is_supervised,
            input.supervision_duration_seconds,
            input.category_id,
        );
        note.content = input.content.clone();
        backend.notes.insert(id, note.clone());
        Ok(note)
    }

    async fn update_note(&self, note_id: i64, input: &NoteInput) -> PortResult<Note> {
        let mut backend = self.enter()?;
        let note = backend
            .notes
            .get_mut(&note_id)
            .ok_or_else(|| PortError::NotFound("Note not found".into()))?;
        note.title = input.title.clone();
        note.content = input.content.clone();
        note.category_id = input.category_id;
        note.supervision =
            Supervision::from_parts(input.is_supervised, input.supervision_duration_seconds);
        Ok(note.clone())
    }

    async fn delete_note(&self, note_id: i64) -> PortResult<()> {
        let mut backend = self.enter()?;
        backend
            .notes
            .remove(&note_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound("Note not found".into()))
    }

    async fn summarize_note(&self, note_id: i64) -> PortResult<AiSummary> {
        let mut backend = self.enter()?;
        let note = backend
            .notes
            .get_mut(&note_id)
            .ok_or_else(|| PortError::NotFound("Note not found".into()))?;
        let summary = AiSummary {
            summary_text: format!("summary of {}", note.title),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            model_used: Some("test-model".into()),
        };
        note.ai_summary = Some(summary.clone());
        Ok(summary)
    }

    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        let backend = self.enter()?;
        Ok(backend.categories.values().cloned().collect())
    }

    async fn create_category(&self, name: &str) -> PortResult<Category> {
        let mut backend = self.enter()?;
        backend.next_id += 1;
        let category = Category {
            id: backend.next_id,
            name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        backend.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, category_id: i64, name: &str) -> PortResult<Category> {
        let mut backend = self.enter()?;
        let category = backend
            .categories
            .get_mut(&category_id)
            .ok_or_else(|| PortError::NotFound("Category not found".into()))?;
        category.name = name.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, category_id: i64) -> PortResult<()> {
        let mut backend = self.enter()?;
        if backend
            .notes
            .values()
            .any(|note| note.category_id == Some(category_id))
        {
            return Err(PortError::Conflict(
                "Cannot delete a category that still has notes".into(),
            ));
        }
        backend
            .categories
            .remove(&category_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound("Category not found".into()))
    }

    async fn today_tasks(&self) -> PortResult<Vec<ReviewTask>> {
        let backend = self.enter()?;
        Ok(backend
            .due
            .iter()
            .filter_map(|id| backend.notes.get(id))
            .map(|note| ReviewTask {
                note_id: note.id,
                title: note.title.clone(),
                category_name: note.category_name.clone(),
                supervision: note.supervision,
                current_review_stage: note
                    .current_review_record
                    .as_ref()
                    .map(|r| r.stage_number)
                    .unwrap_or(1),
                ai_summary: None,
            })
            .collect())
    }

    async fn submit_review(&self, submission: &ReviewSubmission) -> PortResult<ReviewOutcome> {
        let hold = self.hold.lock().unwrap().clone();
        if let Some(hold) = hold {
            hold.notified().await;
        }

        let mut backend = self.enter()?;
        if !backend.due.remove(&submission.note_id) {
            return Err(PortError::BadRequest(
                "Invalid task: No pending review found for this note.".into(),
            ));
        }
        backend.submissions.push(submission.clone());

        let note = backend
            .notes
            .get_mut(&submission.note_id)
            .ok_or_else(|| PortError::NotFound("Note not found".into()))?;
        let stage = note
            .current_review_record
            .as_ref()
            .map(|r| r.stage_number)
            .unwrap_or(1);
        note.current_review_record = Some(ReviewRecord {
            stage_number: match submission.result {
                ReviewResult::Remembered => stage + 1,
                ReviewResult::Fuzzy | ReviewResult::Forgotten => 1,
            },
            scheduled_for: next_review_date(),
        });

        Ok(ReviewOutcome {
            next_review_date: next_review_date(),
        })
    }
}

pub struct Harness {
    pub state: AppState,
    pub backend: Arc<FakeGateway>,
    pub clock: Arc<ManualClock>,
}

pub fn harness() -> Harness {
    let backend = Arc::new(FakeGateway::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    ));
    let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
    let state = AppState::assemble(backend.clone(), session, clock.clone());
    Harness {
        state,
        backend,
        clock,
    }
}

/// Waits (bounded) until the watched value satisfies `predicate`.
pub async fn wait_for<T, F>(rx: &mut watch::Receiver<T>, predicate: F) -> T
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let found = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let current = rx.borrow_and_update().clone();
            if predicate(&current) {
                return current;
            }
            rx.changed().await.expect("sender dropped");
        }
    })
    .await;
    found.expect("condition was not reached in time")
}

/// Polls `condition` until it holds, yielding to other tasks in between.
pub async fn eventually<F, Fut>(condition: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..1000 {
        if condition().await {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never held");
}
