//! services/recall/src/cache/tasks.rs
//!
//! Today's review tasks. The backend's list is authoritative for the day; the
//! cache only ever replaces it wholesale or drops a task that was just reviewed.

use async_trait::async_trait;
use recall_core::domain::ReviewTask;
use recall_core::ports::{NotesGateway, PortResult};
use std::sync::Arc;

use crate::cache::invalidation::{Invalidation, InvalidationSubscriber};
use crate::cache::state::{remove_keyed, CacheCell, CacheState};

pub struct TasksCache {
    gateway: Arc<dyn NotesGateway>,
    cell: CacheCell<Vec<ReviewTask>>,
}

impl TasksCache {
    pub fn new(gateway: Arc<dyn NotesGateway>) -> Self {
        Self {
            gateway,
            cell: CacheCell::new("tasks"),
        }
    }

    pub async fn snapshot(&self) -> CacheState<Vec<ReviewTask>> {
        self.cell.snapshot().await
    }

    pub async fn fetch(&self) -> PortResult<Vec<ReviewTask>> {
        self.cell
            .track("fetch", self.gateway.today_tasks(), |data, tasks| {
                *data = tasks.clone();
            })
            .await
    }
}

#[async_trait]
impl InvalidationSubscriber for TasksCache {
    fn name(&self) -> &'static str {
        "tasks cache"
    }

    async fn on_invalidation(&self, event: &Invalidation) -> PortResult<()> {
        match event {
            Invalidation::ReviewSubmitted { note_id, .. } => {
                // Drop it right away so a failed refetch cannot leave it listed.
                self.cell.patch(|tasks| remove_keyed(tasks, *note_id)).await;
                self.fetch().await.map(|_| ())
            }
        }
    }
}
