//! services/recall/src/review/countdown.rs
//!
//! The supervision countdown: a per-session task that wakes on every whole
//! second of session time until the gate opens.

use recall_core::ports::Clock;
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::review::session::ReviewSession;

/// Runs until the gate opens, the session is dropped, or `cancel` fires.
///
/// Holds only a weak handle so a session dropped by its owner is not kept
/// alive by its own timer.
pub(crate) async fn run_countdown(
    session: Weak<ReviewSession>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
) {
    debug!("Countdown started.");

    loop {
        let deadline = {
            let Some(session) = session.upgrade() else {
                debug!("Countdown stopped, session dropped.");
                return;
            };
            match session.tick() {
                Some(deadline) => deadline,
                None => {
                    debug!("Countdown finished for session {}.", session.id());
                    return;
                }
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Countdown cancelled.");
                return;
            }
            _ = clock.sleep_until(deadline) => {}
        }
    }
}
