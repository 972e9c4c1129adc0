//! # Messages
//!
//! The envelope flowing through an actor's mailbox. Control, Content and
//! Request share one queue, so their relative order is exactly the order in
//! which a single producer sent them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::action::Action;

/// Target value meaning "not addressed to a sub-target".
pub const NO_TARGET: &str = "";

/// Directs a status transition, optionally at a named sub-target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub id: u64,
    pub action: Action,
    pub note: Option<String>,
    pub target: String,
}

/// A payload to hand to the actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content<T> {
    pub id: u64,
    pub data: T,
    pub target: String,
}

/// Asks the actor to resolve a payload itself (e.g. from a queue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub target: String,
}

/// # Message
///
/// Tagged union of everything an actor can receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message<T> {
    Control(Control),
    Content(Content<T>),
    Request(Request),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Control,
    Content,
    Request,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Control => write!(f, "control"),
            MessageKind::Content => write!(f, "content"),
            MessageKind::Request => write!(f, "request"),
        }
    }
}

impl<T> Message<T> {
    pub fn control(id: u64, action: Action, note: Option<String>, target: impl Into<String>) -> Self {
        Message::Control(Control {
            id,
            action,
            note,
            target: target.into(),
        })
    }

    pub fn content(id: u64, data: T, target: impl Into<String>) -> Self {
        Message::Content(Content {
            id,
            data,
            target: target.into(),
        })
    }

    pub fn request(id: u64, target: impl Into<String>) -> Self {
        Message::Request(Request {
            id,
            target: target.into(),
        })
    }

    pub fn id(&self) -> u64 {
        match self {
            Message::Control(c) => c.id,
            Message::Content(c) => c.id,
            Message::Request(r) => r.id,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Control(_) => MessageKind::Control,
            Message::Content(_) => MessageKind::Content,
            Message::Request(_) => MessageKind::Request,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Message::Control(c) => &c.target,
            Message::Content(c) => &c.target,
            Message::Request(r) => &r.target,
        }
    }

    pub fn has_target(&self) -> bool {
        self.target() != NO_TARGET
    }
}

/// Monotonic id source shared by every sender of one actor.
///
/// Ids are for tracing only; the mailbox order is what orders messages.
#[derive(Debug, Default)]
pub struct MessageIds {
    next: AtomicU64,
}

impl MessageIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id, starting at 1.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Outcome of a gated send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Receipt {
    /// The message was enqueued
    Accepted,
    /// The admission gate refused the message; it never reached the mailbox
    Rejected,
}

impl Receipt {
    pub fn is_accepted(self) -> bool {
        self == Receipt::Accepted
    }
}
