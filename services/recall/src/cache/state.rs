//! services/recall/src/cache/state.rs
//!
//! The loading/error/data triple every entity cache exposes, and the single
//! place where a remote call is tracked against it.

use recall_core::ports::PortResult;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::warn;

/// A point-in-time copy of a cache, safe to hand to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheState<S> {
    pub data: S,
    pub loading: bool,
    pub error: Option<String>,
}

/// Shared, mutable cache state. Writers are serialized by the lock but not
/// coordinated with each other: the last completed write wins.
#[derive(Debug)]
pub struct CacheCell<S> {
    name: &'static str,
    state: RwLock<CacheState<S>>,
}

impl<S: Clone + Default> CacheCell<S> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub async fn snapshot(&self) -> CacheState<S> {
        self.state.read().await.clone()
    }

    /// Applies a local change that needs no remote call.
    pub async fn patch(&self, apply: impl FnOnce(&mut S)) {
        let mut state = self.state.write().await;
        apply(&mut state.data);
    }

    /// Runs `request` with `loading` raised. On success `apply` is folded into
    /// the data in the same critical section that lowers `loading`, so no reader
    /// sees `loading == false` alongside stale data. On failure the message is
    /// recorded and the error handed back to the caller.
    pub async fn track<R, Fut, A>(&self, operation: &str, request: Fut, apply: A) -> PortResult<R>
    where
        Fut: Future<Output = PortResult<R>>,
        A: FnOnce(&mut S, &R),
    {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        match request.await {
            Ok(value) => {
                let mut state = self.state.write().await;
                apply(&mut state.data, &value);
                state.loading = false;
                Ok(value)
            }
            Err(err) => {
                warn!("{} cache: {} failed: {}", self.name, operation, err);
                let mut state = self.state.write().await;
                state.error = Some(err.to_string());
                state.loading = false;
                Err(err)
            }
        }
    }
}

/// Entities addressed by a numeric id.
pub trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for recall_core::Category {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for recall_core::NoteListItem {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for recall_core::ReviewTask {
    fn key(&self) -> i64 {
        self.note_id
    }
}

/// Replaces the entity with the same key in place. Returns whether one matched.
pub fn replace_keyed<T: Keyed>(items: &mut [T], updated: T) -> bool {
    match items.iter_mut().find(|item| item.key() == updated.key()) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

pub fn remove_keyed<T: Keyed>(items: &mut Vec<T>, key: i64) {
    items.retain(|item| item.key() != key);
}

/// Appends the entity unless one with the same key is already present.
pub fn upsert_keyed<T: Keyed>(items: &mut Vec<T>, entity: T) {
    let key = entity.key();
    match items.iter_mut().find(|item| item.key() == key) {
        Some(slot) => *slot = entity,
        None => items.push(entity),
    }
}
