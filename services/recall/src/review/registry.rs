//! services/recall/src/review/registry.rs
//!
//! Open review sessions, keyed by note. Reopening a note whose session is still
//! live resumes that session instead of restarting its countdown.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::ReviewError;
use crate::review::session::{ReviewContext, ReviewSession};

pub struct ReviewSessions {
    ctx: ReviewContext,
    sessions: Mutex<HashMap<i64, Arc<ReviewSession>>>,
}

impl ReviewSessions {
    pub fn new(ctx: ReviewContext) -> Self {
        Self {
            ctx,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the live session for `note_id`, or starts a new one.
    ///
    /// The note loads without the registry lock held, so other notes can be
    /// opened or closed meanwhile. If two callers race to open the same note,
    /// the first to finish wins and the other's session is cancelled.
    pub async fn open(&self, note_id: i64) -> Result<Arc<ReviewSession>, ReviewError> {
        if let Some(existing) = self.get(note_id).await {
            info!("Resuming review session {} for note {}", existing.id(), note_id);
            return Ok(existing);
        }

        let session = ReviewSession::open(self.ctx.clone(), note_id).await?;

        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, session| !session.is_closed());
        if let Some(existing) = sessions.get(&note_id) {
            info!(
                "Note {} was opened concurrently, keeping session {}",
                note_id,
                existing.id()
            );
            session.cancel();
            return Ok(existing.clone());
        }
        sessions.insert(note_id, session.clone());
        Ok(session)
    }

    pub async fn get(&self, note_id: i64) -> Option<Arc<ReviewSession>> {
        self.sessions
            .lock()
            .await
            .get(&note_id)
            .filter(|session| !session.is_closed())
            .cloned()
    }

    /// Tears down the session for `note_id`. Returns whether one was open.
    pub async fn close(&self, note_id: i64) -> bool {
        match self.sessions.lock().await.remove(&note_id) {
            Some(session) => {
                session.cancel();
                true
            }
            None => false,
        }
    }
}
