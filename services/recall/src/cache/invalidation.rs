//! services/recall/src/cache/invalidation.rs
//!
//! The review controller never touches cache internals. After a successful
//! submission it publishes an `Invalidation` here; the caches subscribe and
//! refresh themselves.

use async_trait::async_trait;
use chrono::NaiveDate;
use recall_core::ports::PortResult;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// A note was reviewed; its task is done for today and its review record moved.
    ReviewSubmitted {
        note_id: i64,
        next_review_date: NaiveDate,
    },
}

#[async_trait]
pub trait InvalidationSubscriber: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_invalidation(&self, event: &Invalidation) -> PortResult<()>;
}

pub struct InvalidationBus {
    subscribers: RwLock<Vec<Arc<dyn InvalidationSubscriber>>>,
    events: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            subscribers: RwLock::new(Vec::new()),
            events,
        }
    }

    pub fn subscribe(&self, subscriber: Arc<dyn InvalidationSubscriber>) {
        match self.subscribers.write() {
            Ok(mut subscribers) => subscribers.push(subscriber),
            Err(poisoned) => poisoned.into_inner().push(subscriber),
        }
    }

    /// A passive feed of every published event, for observers that only display.
    pub fn watch(&self) -> broadcast::Receiver<Invalidation> {
        self.events.subscribe()
    }

    /// Delivers `event` to every subscriber in registration order and waits for
    /// each to finish. A failing subscriber is logged and skipped.
    pub async fn publish(&self, event: Invalidation) {
        let subscribers: Vec<_> = match self.subscribers.read() {
            Ok(subscribers) => subscribers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        for subscriber in subscribers {
            debug!("Delivering {:?} to {}", event, subscriber.name());
            if let Err(e) = subscriber.on_invalidation(&event).await {
                warn!("{} failed to refresh after {:?}: {}", subscriber.name(), event, e);
            }
        }

        // No receivers is fine.
        let _ = self.events.send(event);
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::ports::PortError;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl InvalidationSubscriber for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn on_invalidation(&self, _event: &Invalidation) -> PortResult<()> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                Err(PortError::Network("offline".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn delivers_in_order_past_failures() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = InvalidationBus::new();
        bus.subscribe(Arc::new(Recorder { name: "first", log: log.clone(), fail: true }));
        bus.subscribe(Arc::new(Recorder { name: "second", log: log.clone(), fail: false }));
        let mut feed = bus.watch();

        let event = Invalidation::ReviewSubmitted {
            note_id: 1,
            next_review_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        bus.publish(event.clone()).await;

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(feed.recv().await.unwrap(), event);
    }
}
