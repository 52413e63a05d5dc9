//! services/recall/src/review/session.rs
//!
//! One review attempt for one note, from loading the note to submitting a
//! result or being torn down.
//!
//! `Loading -> Active(gate Closed|Open) -> Submitting -> Closed`
//!
//! A supervised note keeps the gate closed until its supervision time has
//! elapsed; the gate never closes again once open. The duration reported to
//! the backend is measured from session creation, independently of the gate.

use chrono::{DateTime, Duration, Utc};
use recall_core::domain::{
    Note, ReviewOutcome, ReviewResult, ReviewSubmission, Supervision,
};
use recall_core::ports::{Clock, NotesGateway};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cache::{Invalidation, InvalidationBus, NotesCache};
use crate::error::ReviewError;
use crate::review::countdown;

//=========================================================================================
// Observable State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Result controls are disabled.
    Closed { remaining_seconds: u32 },
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Active { gate: Gate },
    Submitting,
    /// Finished. `outcome` is set only when a result was accepted.
    Closed { outcome: Option<ReviewOutcome> },
}

/// What the presentation layer renders for a session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub note_id: i64,
    pub phase: SessionPhase,
    pub note: Option<Note>,
    /// Captured when the note loaded; later edits to the note do not apply.
    pub supervision: Supervision,
    pub started_at: DateTime<Utc>,
    /// When the countdown began, i.e. when the note finished loading.
    pub gate_armed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn gate_open(&self) -> bool {
        matches!(self.phase, SessionPhase::Active { gate: Gate::Open })
    }

    pub fn remaining_seconds(&self) -> u32 {
        match self.phase {
            SessionPhase::Active {
                gate: Gate::Closed { remaining_seconds },
            } => remaining_seconds,
            SessionPhase::Loading => self.supervision.required_seconds(),
            _ => 0,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SessionPhase::Submitting
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, SessionPhase::Closed { .. })
    }
}

fn gate_at(supervision: Supervision, armed_at: DateTime<Utc>, now: DateTime<Utc>) -> Gate {
    let required = i64::from(supervision.required_seconds());
    let elapsed = (now - armed_at).num_seconds().max(0);
    if elapsed >= required {
        Gate::Open
    } else {
        Gate::Closed {
            remaining_seconds: (required - elapsed) as u32,
        }
    }
}

//=========================================================================================
// ReviewContext (Shared Across Sessions)
//=========================================================================================

/// The collaborators every session needs.
#[derive(Clone)]
pub struct ReviewContext {
    pub gateway: Arc<dyn NotesGateway>,
    pub notes: Arc<NotesCache>,
    pub clock: Arc<dyn Clock>,
    pub bus: Arc<InvalidationBus>,
}

//=========================================================================================
// ReviewSession
//=========================================================================================

pub struct ReviewSession {
    id: Uuid,
    note_id: i64,
    started_at: DateTime<Utc>,
    ctx: ReviewContext,
    state: watch::Sender<SessionSnapshot>,
    /// Stops the countdown task when the session is torn down.
    cancel: CancellationToken,
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("id", &self.id)
            .field("note_id", &self.note_id)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl ReviewSession {
    /// Creates a session and loads its note. A load failure ends the session
    /// before it ever becomes active.
    pub async fn open(ctx: ReviewContext, note_id: i64) -> Result<Arc<Self>, ReviewError> {
        let started_at = ctx.clock.now();
        let id = Uuid::new_v4();
        let (state, _) = watch::channel(SessionSnapshot {
            session_id: id,
            note_id,
            phase: SessionPhase::Loading,
            note: None,
            supervision: Supervision::Unsupervised,
            started_at,
            gate_armed_at: None,
            last_error: None,
        });

        let session = Arc::new(Self {
            id,
            note_id,
            started_at,
            ctx,
            state,
            cancel: CancellationToken::new(),
        });
        info!("Review session {} loading note {}", id, note_id);

        let note = match session.ctx.notes.fetch_detail(note_id).await {
            Ok(note) => note,
            Err(e) => {
                error!("Review session {} could not load note {}: {}", id, note_id, e);
                session.cancel.cancel();
                session.state.send_modify(|s| {
                    s.phase = SessionPhase::Closed { outcome: None };
                    s.last_error = Some(e.to_string());
                });
                return Err(e.into());
            }
        };

        let armed_at = session.ctx.clock.now();
        let supervision = note.supervision;
        let gate = gate_at(supervision, armed_at, armed_at);
        session.state.send_modify(|s| {
            s.note = Some(note);
            s.supervision = supervision;
            s.gate_armed_at = Some(armed_at);
            s.phase = SessionPhase::Active { gate };
        });

        match gate {
            Gate::Open => info!("Review session {} active, no supervision", id),
            Gate::Closed { remaining_seconds } => {
                info!(
                    "Review session {} active, results unlock in {}s",
                    id, remaining_seconds
                );
                tokio::spawn(countdown::run_countdown(
                    Arc::downgrade(&session),
                    session.ctx.clock.clone(),
                    session.cancel.clone(),
                ));
            }
        }

        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn note_id(&self) -> i64 {
        self.note_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Notifies on every phase change and countdown tick.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn gate_open(&self) -> bool {
        self.state.borrow().gate_open()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.state.borrow().remaining_seconds()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().is_closed()
    }

    /// Re-evaluates a closed gate against the clock. Returns the instant of the
    /// next whole-second tick while the gate stays closed, `None` otherwise.
    pub(crate) fn tick(&self) -> Option<DateTime<Utc>> {
        let now = self.ctx.clock.now();
        let mut next_tick = None;

        self.state.send_if_modified(|s| {
            let previous = match s.phase {
                SessionPhase::Active {
                    gate: Gate::Closed { remaining_seconds },
                } => remaining_seconds,
                _ => return false,
            };
            let Some(armed_at) = s.gate_armed_at else {
                return false;
            };

            match gate_at(s.supervision, armed_at, now) {
                Gate::Open => {
                    info!("Review session {} gate open", self.id);
                    s.phase = SessionPhase::Active { gate: Gate::Open };
                    true
                }
                Gate::Closed { remaining_seconds } => {
                    let elapsed = s.supervision.required_seconds() - remaining_seconds;
                    next_tick = Some(armed_at + Duration::seconds(i64::from(elapsed) + 1));
                    s.phase = SessionPhase::Active {
                        gate: Gate::Closed { remaining_seconds },
                    };
                    remaining_seconds != previous
                }
            }
        });

        next_tick
    }

    /// Submits the user's recall result.
    ///
    /// Rejected while the gate is closed or another submission is in flight.
    /// On success the session closes and the caches are told to refresh; on
    /// failure the session returns to the open gate so the user can retry.
    pub async fn submit(&self, result: ReviewResult) -> Result<ReviewOutcome, ReviewError> {
        let now = self.ctx.clock.now();
        let mut rejection = None;

        self.state.send_if_modified(|s| match s.phase {
            SessionPhase::Loading => {
                rejection = Some(ReviewError::NotActive);
                false
            }
            SessionPhase::Submitting => {
                rejection = Some(ReviewError::SubmissionInFlight);
                false
            }
            SessionPhase::Closed { .. } => {
                rejection = Some(ReviewError::SessionClosed);
                false
            }
            SessionPhase::Active { gate } => {
                let gate = match (gate, s.gate_armed_at) {
                    (Gate::Closed { .. }, Some(armed_at)) => gate_at(s.supervision, armed_at, now),
                    (gate, _) => gate,
                };
                if let Gate::Closed { remaining_seconds } = gate {
                    rejection = Some(ReviewError::GateClosed { remaining_seconds });
                    s.phase = SessionPhase::Active { gate };
                } else {
                    s.phase = SessionPhase::Submitting;
                    s.last_error = None;
                }
                true
            }
        });

        if let Some(rejection) = rejection {
            warn!("Review session {} rejected {}: {}", self.id, result, rejection);
            return Err(rejection);
        }

        let review_duration_seconds =
            u32::try_from((now - self.started_at).num_seconds().max(0)).unwrap_or(u32::MAX);
        let submission = ReviewSubmission {
            note_id: self.note_id,
            result,
            review_duration_seconds,
        };
        info!(
            "Review session {} submitting {} after {}s",
            self.id, result, review_duration_seconds
        );

        let response = self.ctx.gateway.submit_review(&submission).await;

        if self.cancel.is_cancelled() {
            warn!(
                "Review session {} was closed while submitting, discarding the response",
                self.id
            );
            return Err(ReviewError::SessionClosed);
        }

        match response {
            Ok(outcome) => {
                info!(
                    "Review session {} complete, next review on {}",
                    self.id, outcome.next_review_date
                );
                self.state.send_modify(|s| {
                    s.phase = SessionPhase::Closed {
                        outcome: Some(outcome.clone()),
                    };
                });
                self.cancel.cancel();
                self.ctx
                    .bus
                    .publish(Invalidation::ReviewSubmitted {
                        note_id: self.note_id,
                        next_review_date: outcome.next_review_date,
                    })
                    .await;
                Ok(outcome)
            }
            Err(e) => {
                error!("Review session {} submission failed: {}", self.id, e);
                self.state.send_modify(|s| {
                    s.phase = SessionPhase::Active { gate: Gate::Open };
                    s.last_error = Some(e.to_string());
                });
                Err(e.into())
            }
        }
    }

    /// Tears the session down: the countdown stops and any late response is dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
        let closed = self.state.send_if_modified(|s| {
            if s.is_closed() {
                false
            } else {
                s.phase = SessionPhase::Closed { outcome: None };
                true
            }
        });
        if closed {
            info!("Review session {} abandoned", self.id);
        }
    }
}

impl Drop for ReviewSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
