//! # Diagnostics hook
//!
//! A [`Tracker`] sees every message an actor dequeues, tagged with how it was
//! dequeued, and every handling failure. Logging or metrics collaborators
//! plug in here.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::errors::ActorError;
use crate::id::ActorId;
use crate::message::{Message, MessageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackKind {
    /// Dequeued by `Puller::pull`
    Pull,
    /// Dequeued by `Puller::poll`
    Poll,
    /// Dequeued by the consumer loop
    Work,
    /// Discarded by `Puller::wipe`
    Wipe,
    /// Handling the message failed
    Error,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TrackKind::Pull => "PULL",
            TrackKind::Poll => "POLL",
            TrackKind::Work => "WORK",
            TrackKind::Wipe => "WIPE",
            TrackKind::Error => "ERROR",
        };
        f.write_str(tag)
    }
}

/// What a tracker is told about one message. The payload itself is not
/// included; by the time a handler fails it has been moved into the handler.
#[derive(Debug, Clone, Copy)]
pub struct Trace<'a> {
    pub actor: &'a ActorId,
    pub kind: TrackKind,
    pub id: u64,
    pub message: MessageKind,
    pub target: &'a str,
    pub error: Option<&'a ActorError>,
}

impl<'a> Trace<'a> {
    pub fn of<T>(actor: &'a ActorId, kind: TrackKind, message: &'a Message<T>) -> Self {
        Self {
            actor,
            kind,
            id: message.id(),
            message: message.kind(),
            target: message.target(),
            error: None,
        }
    }

    pub fn failure(
        actor: &'a ActorId,
        id: u64,
        message: MessageKind,
        target: &'a str,
        error: &'a ActorError,
    ) -> Self {
        Self {
            actor,
            kind: TrackKind::Error,
            id,
            message,
            target,
            error: Some(error),
        }
    }
}

pub trait Tracker: Send + Sync + 'static {
    fn track(&self, trace: &Trace<'_>);
}

/// Default tracker: one `trace!` event per message.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracker;

impl Tracker for LogTracker {
    fn track(&self, t: &Trace<'_>) {
        trace!(
            actor = %t.actor,
            kind = %t.kind,
            id = t.id,
            message = %t.message,
            target = t.target,
            error = ?t.error,
            "track"
        );
    }
}

impl<F> Tracker for F
where
    F: Fn(&Trace<'_>) + Send + Sync + 'static,
{
    fn track(&self, trace: &Trace<'_>) {
        self(trace)
    }
}
