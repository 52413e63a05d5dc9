//! services/recall/src/cache/notes.rs
//!
//! The notes cache: the list view under its current filter, plus the detail of
//! the note currently open.

use async_trait::async_trait;
use recall_core::domain::{AiSummary, Note, NoteFilter, NoteInput, NoteListItem};
use recall_core::ports::{NotesGateway, PortError, PortResult};
use recall_core::validate;
use std::sync::Arc;
use tracing::info;

use crate::cache::invalidation::{Invalidation, InvalidationSubscriber};
use crate::cache::state::{remove_keyed, replace_keyed, upsert_keyed, CacheCell, CacheState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotesData {
    pub items: Vec<NoteListItem>,
    /// The note opened in a detail or review view.
    pub current: Option<Note>,
    /// The filter the list was last fetched with.
    pub filter: NoteFilter,
}

fn admits(filter: NoteFilter, note: &Note) -> bool {
    match filter {
        NoteFilter::All => true,
        NoteFilter::Category(id) => note.category_id == Some(id),
        NoteFilter::Uncategorized => note.category_id.is_none(),
    }
}

pub struct NotesCache {
    gateway: Arc<dyn NotesGateway>,
    cell: CacheCell<NotesData>,
}

impl NotesCache {
    pub fn new(gateway: Arc<dyn NotesGateway>) -> Self {
        Self {
            gateway,
            cell: CacheCell::new("notes"),
        }
    }

    pub async fn snapshot(&self) -> CacheState<NotesData> {
        self.cell.snapshot().await
    }

    /// Replaces the list with the notes matching `filter`.
    pub async fn fetch(&self, filter: NoteFilter) -> PortResult<Vec<NoteListItem>> {
        self.cell
            .track("fetch", self.gateway.list_notes(filter), |data, items| {
                data.items = items.clone();
                data.filter = filter;
            })
            .await
    }

    /// Loads one note in full and makes it the current note.
    pub async fn fetch_detail(&self, note_id: i64) -> PortResult<Note> {
        self.cell
            .track("fetch_detail", self.gateway.get_note(note_id), |data, note| {
                data.current = Some(note.clone());
            })
            .await
    }

    pub async fn create(&self, input: &NoteInput) -> PortResult<Note> {
        validate::note_input(input)?;

        let note = self
            .cell
            .track("create", self.gateway.create_note(input), |data, note| {
                if admits(data.filter, note) {
                    upsert_keyed(&mut data.items, NoteListItem::from(note));
                }
            })
            .await?;
        info!("Created note {}", note.id);
        Ok(note)
    }

    pub async fn update(&self, note_id: i64, input: &NoteInput) -> PortResult<Note> {
        validate::note_input(input)?;

        self.cell
            .track("update", self.gateway.update_note(note_id, input), |data, note| {
                if admits(data.filter, note) {
                    replace_keyed(&mut data.items, NoteListItem::from(note));
                } else {
                    remove_keyed(&mut data.items, note.id);
                }
                if data.current.as_ref().map(|c| c.id) == Some(note.id) {
                    data.current = Some(note.clone());
                }
            })
            .await
    }

    pub async fn remove(&self, note_id: i64) -> PortResult<()> {
        self.cell
            .track("remove", self.gateway.delete_note(note_id), |data, _| {
                remove_keyed(&mut data.items, note_id);
                if data.current.as_ref().map(|c| c.id) == Some(note_id) {
                    data.current = None;
                }
            })
            .await?;
        info!("Deleted note {}", note_id);
        Ok(())
    }

    /// Asks the backend for an AI summary. The current note is reloaded when it
    /// is the one summarized, so its embedded summary is fresh.
    pub async fn summarize(&self, note_id: i64) -> PortResult<AiSummary> {
        let is_current = self.cell.snapshot().await.data.current.map(|c| c.id) == Some(note_id);
        let gateway = self.gateway.clone();

        let request = async move {
            let summary = gateway.summarize_note(note_id).await?;
            let refreshed = if is_current {
                Some(gateway.get_note(note_id).await?)
            } else {
                None
            };
            Ok::<_, PortError>((summary, refreshed))
        };

        let (summary, _) = self
            .cell
            .track("summarize", request, |data, outcome| {
                let (summary, refreshed) = outcome;
                if let Some(item) = data.items.iter_mut().find(|item| item.id == note_id) {
                    item.ai_summary_preview = Some(summary.summary_text.clone());
                }
                if let Some(note) = refreshed {
                    data.current = Some(note.clone());
                }
            })
            .await?;
        Ok(summary)
    }

    pub async fn clear_current(&self) {
        self.cell.patch(|data| data.current = None).await;
    }
}

#[async_trait]
impl InvalidationSubscriber for NotesCache {
    fn name(&self) -> &'static str {
        "notes cache"
    }

    async fn on_invalidation(&self, event: &Invalidation) -> PortResult<()> {
        match event {
            Invalidation::ReviewSubmitted { note_id, .. } => {
                let is_current =
                    self.cell.snapshot().await.data.current.map(|c| c.id) == Some(*note_id);
                if is_current {
                    self.fetch_detail(*note_id).await?;
                }
                Ok(())
            }
        }
    }
}
