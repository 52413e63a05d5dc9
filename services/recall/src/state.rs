//! services/recall/src/state.rs
//!
//! Wires the client together: one gateway, one persistent session, the three
//! entity caches and the review sessions, all sharing one invalidation bus.

use recall_core::ports::{Clock, KeyValueStore, NotesGateway, PortResult};
use std::sync::Arc;

use crate::adapters::{FileStore, HttpGateway, SystemClock};
use crate::cache::{CategoriesCache, InvalidationBus, NotesCache, TasksCache};
use crate::config::Config;
use crate::review::{ReviewContext, ReviewSessions};
use crate::session::{AuthService, SessionStore};

/// The client state, created once at startup and handed to every surface.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub gateway: Arc<dyn NotesGateway>,
    pub auth: AuthService,
    pub notes: Arc<NotesCache>,
    pub categories: Arc<CategoriesCache>,
    pub tasks: Arc<TasksCache>,
    pub bus: Arc<InvalidationBus>,
    pub reviews: Arc<ReviewSessions>,
}

impl AppState {
    /// Builds the production wiring: HTTP backend, file-backed session, wall clock.
    pub fn from_config(config: &Config) -> PortResult<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.session_file)?);
        let session = Arc::new(SessionStore::new(storage));
        let gateway: Arc<dyn NotesGateway> = Arc::new(HttpGateway::new(
            config.api_base_url.clone(),
            config.request_timeout,
            session.clone(),
        )?);
        Ok(Self::assemble(gateway, session, Arc::new(SystemClock)))
    }

    /// Builds the state around explicit collaborators.
    pub fn assemble(
        gateway: Arc<dyn NotesGateway>,
        session: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let notes = Arc::new(NotesCache::new(gateway.clone()));
        let categories = Arc::new(CategoriesCache::new(gateway.clone()));
        let tasks = Arc::new(TasksCache::new(gateway.clone()));

        let bus = Arc::new(InvalidationBus::new());
        bus.subscribe(tasks.clone());
        bus.subscribe(notes.clone());

        let reviews = Arc::new(ReviewSessions::new(ReviewContext {
            gateway: gateway.clone(),
            notes: notes.clone(),
            clock,
            bus: bus.clone(),
        }));

        Self {
            auth: AuthService::new(gateway.clone(), session.clone()),
            session,
            gateway,
            notes,
            categories,
            tasks,
            bus,
            reviews,
        }
    }
}
