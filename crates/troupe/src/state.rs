//! # Actor State
//!
//! The shared status of one actor and the only code allowed to move it.
//!
//! `State` is written by exactly two parties: the actor's consumer loop (while
//! dispatching Control messages) and `force`, the explicit synchronous
//! override. Everybody else only reads. Every write publishes a
//! [`StatusChange`] and wakes tasks waiting in [`State::wait_for`].
//!
//! Next to the live status, `State` keeps the expected status: where the actor
//! ends up once every Control issued so far has been handled. Handles admit
//! payloads against it, so `start()` followed by `send(..)` is accepted
//! without waiting for the loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Notify};
use tracing::debug;

use crate::action::Action;
use crate::id::ActorId;
use crate::message::NO_TARGET;
use crate::status::{Status, StatusCell};

/// Buffer of the status change broadcast; slow subscribers lag, they never
/// block a transition.
const EVENT_BUFFER: usize = 64;

/// # StatusChange
///
/// One observed transition. Emitted even when `old == new` (probes), so
/// listeners see every handled Control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub actor: ActorId,
    /// Worker name when the change concerns a worker inside a group
    pub target: String,
    pub action: Action,
    pub old: Status,
    pub new: Status,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    pub fn new(actor: ActorId, target: impl Into<String>, action: Action, old: Status, new: Status) -> Self {
        Self {
            actor,
            target: target.into(),
            action,
            old,
            new,
            note: None,
            at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn changed(&self) -> bool {
        self.old != self.new
    }
}

/// # State
///
/// Atomically stored status plus the transition function.
#[derive(Debug)]
pub struct State {
    id: ActorId,
    cell: StatusCell,
    expected: StatusCell,
    notify: Notify,
    events: broadcast::Sender<StatusChange>,
}

impl State {
    pub fn new(id: ActorId) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            id,
            cell: StatusCell::new(Status::InActive),
            expected: StatusCell::new(Status::InActive),
            notify: Notify::new(),
            events,
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn status(&self) -> Status {
        self.cell.get()
    }

    /// Status after every issued Control has been handled.
    pub fn expected(&self) -> Status {
        self.expected.get()
    }

    /// Records that a Control for `action` is on its way to the mailbox.
    pub(crate) fn issue(&self, action: Action) {
        if !action.is_probe() {
            self.expected.update(|current| action.to_status(current));
        }
    }

    /// Applies `action` through the transition table.
    pub fn handle(&self, action: Action, note: Option<String>) -> StatusChange {
        let (old, new) = self.cell.update(|current| action.to_status(current));
        self.publish(StatusChange::new(self.id.clone(), NO_TARGET, action, old, new).with_note(note))
    }

    /// Moves Started to Running right before the first payload is processed.
    ///
    /// Returns `None` when the actor was not in Started.
    pub fn begin(&self) -> Option<StatusChange> {
        if self.cell.transition(Status::Started, Status::Running) {
            self.expected.transition(Status::Started, Status::Running);
            let change = StatusChange::new(
                self.id.clone(),
                NO_TARGET,
                Action::Process,
                Status::Started,
                Status::Running,
            );
            Some(self.publish(change))
        } else {
            None
        }
    }

    /// Synchronous override that bypasses the mailbox and its ordering.
    pub fn force(&self, action: Action, note: Option<String>) -> StatusChange {
        debug!(actor = %self.id, %action, "Forcing status");
        self.issue(action);
        self.handle(action, note)
    }

    /// Marks the actor Failed. No action maps to Failed, so the change is
    /// recorded as `Process`, the caller-owned marker.
    pub fn fail(&self, note: impl Into<String>) -> StatusChange {
        self.expected.set(Status::Failed);
        let old = self.cell.set(Status::Failed);
        let change = StatusChange::new(self.id.clone(), NO_TARGET, Action::Process, old, Status::Failed)
            .with_note(Some(note.into()));
        self.publish(change)
    }

    /// Once Killed only `Check` is legal.
    pub fn validate(&self, action: Action) -> bool {
        validate(self.status(), action)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.events.subscribe()
    }

    /// Waits until the status equals `status`.
    pub async fn wait_for(&self, status: Status) {
        loop {
            let notified = self.notify.notified(); // Subscribe first
            if self.status() == status {
                return;
            }
            notified.await;
        }
    }

    /// Waits until `predicate` holds for the current status.
    pub async fn wait_until(&self, predicate: impl Fn(Status) -> bool) -> Status {
        loop {
            let notified = self.notify.notified();
            let current = self.status();
            if predicate(current) {
                return current;
            }
            notified.await;
        }
    }

    pub(crate) fn publish(&self, change: StatusChange) -> StatusChange {
        self.notify.notify_waiters();
        // No subscribers is fine
        let _ = self.events.send(change.clone());
        change
    }
}

/// Whether `action` may be issued while in `status`.
pub fn validate(status: Status, action: Action) -> bool {
    match status {
        Status::Killed => action == Action::Check,
        _ => true,
    }
}
