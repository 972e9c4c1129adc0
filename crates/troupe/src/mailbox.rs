//! # Mailbox
//!
//! The ordered, single-consumer queue owned by one actor. Many senders, one
//! receiver. Unbounded by default, so `send` never waits on the consumer; a
//! bounded mailbox applies backpressure (the sender waits for space, nothing
//! is dropped).

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::config::MailboxConfig;
use crate::errors::ActorError;
use crate::message::Message;

/// # Mailbox
///
/// A sender/receiver pair created together. The receiver goes to the actor,
/// the sender to its handles.
pub struct Mailbox<T> {
    pub sender: MailboxSender<T>,
    pub receiver: MailboxReceiver<T>,
}

impl<T> Mailbox<T> {
    pub fn unbounded() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: MailboxSender::Unbounded(tx),
            receiver: MailboxReceiver::Unbounded(rx),
        }
    }

    /// A mailbox holding at most `capacity` messages. A zero capacity is
    /// raised to one.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            sender: MailboxSender::Bounded(tx),
            receiver: MailboxReceiver::Bounded(rx),
        }
    }

    pub fn from_config(config: &MailboxConfig) -> Self {
        match config.capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    pub fn split(self) -> (MailboxSender<T>, MailboxReceiver<T>) {
        (self.sender, self.receiver)
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Producer side of a mailbox. Cheap to clone.
#[derive(Debug)]
pub enum MailboxSender<T> {
    Bounded(mpsc::Sender<Message<T>>),
    Unbounded(mpsc::UnboundedSender<Message<T>>),
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        match self {
            MailboxSender::Bounded(tx) => MailboxSender::Bounded(tx.clone()),
            MailboxSender::Unbounded(tx) => MailboxSender::Unbounded(tx.clone()),
        }
    }
}

impl<T> MailboxSender<T> {
    /// Enqueues `message`. Only waits when a bounded mailbox is full.
    pub async fn send(&self, message: Message<T>) -> Result<(), ActorError> {
        match self {
            MailboxSender::Bounded(tx) => tx.send(message).await.map_err(|_| ActorError::MailboxClosed),
            MailboxSender::Unbounded(tx) => tx.send(message).map_err(|_| ActorError::MailboxClosed),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            MailboxSender::Bounded(tx) => tx.is_closed(),
            MailboxSender::Unbounded(tx) => tx.is_closed(),
        }
    }

    /// Bounded capacity, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            MailboxSender::Bounded(tx) => Some(tx.max_capacity()),
            MailboxSender::Unbounded(_) => None,
        }
    }

    /// A sender that does not keep the mailbox open.
    pub(crate) fn downgrade(&self) -> WeakMailboxSender<T> {
        match self {
            MailboxSender::Bounded(tx) => WeakMailboxSender::Bounded(tx.downgrade()),
            MailboxSender::Unbounded(tx) => WeakMailboxSender::Unbounded(tx.downgrade()),
        }
    }
}

pub(crate) enum WeakMailboxSender<T> {
    Bounded(mpsc::WeakSender<Message<T>>),
    Unbounded(mpsc::WeakUnboundedSender<Message<T>>),
}

impl<T> Clone for WeakMailboxSender<T> {
    fn clone(&self) -> Self {
        match self {
            WeakMailboxSender::Bounded(tx) => WeakMailboxSender::Bounded(tx.clone()),
            WeakMailboxSender::Unbounded(tx) => WeakMailboxSender::Unbounded(tx.clone()),
        }
    }
}

impl<T> WeakMailboxSender<T> {
    pub(crate) fn upgrade(&self) -> Option<MailboxSender<T>> {
        match self {
            WeakMailboxSender::Bounded(tx) => tx.upgrade().map(MailboxSender::Bounded),
            WeakMailboxSender::Unbounded(tx) => tx.upgrade().map(MailboxSender::Unbounded),
        }
    }
}

/// Consumer side of a mailbox. Exactly one per actor.
#[derive(Debug)]
pub enum MailboxReceiver<T> {
    Bounded(mpsc::Receiver<Message<T>>),
    Unbounded(mpsc::UnboundedReceiver<Message<T>>),
}

impl<T> MailboxReceiver<T> {
    /// Waits for the next message. `None` once every sender is gone and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<Message<T>> {
        match self {
            MailboxReceiver::Bounded(rx) => rx.recv().await,
            MailboxReceiver::Unbounded(rx) => rx.recv().await,
        }
    }

    /// Non-blocking poll. `None` when nothing is queued right now.
    pub fn try_recv(&mut self) -> Option<Message<T>> {
        let result = match self {
            MailboxReceiver::Bounded(rx) => rx.try_recv(),
            MailboxReceiver::Unbounded(rx) => rx.try_recv(),
        };
        match result {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Stops accepting new messages; queued ones can still be received.
    pub fn close(&mut self) {
        match self {
            MailboxReceiver::Bounded(rx) => rx.close(),
            MailboxReceiver::Unbounded(rx) => rx.close(),
        }
    }
}
