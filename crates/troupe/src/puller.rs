//! # Manual draining
//!
//! A [`Puller`] drains an actor's mailbox on the caller's task instead of a
//! spawned consumer loop. Useful in tests and for actors driven by an outer
//! schedule. None of its operations wait for messages: on an empty mailbox
//! they return immediately.
//!
//! A Puller borrows the actor mutably, so it can never run alongside the
//! actor's own consumer loop.
//!
//! Handler failures do not stop a drain. The Puller collects them; read them
//! with [`Puller::failures`] once the drain returns.

use tracing::debug;

use crate::actor::{Actor, Behavior};
use crate::errors::ActorError;
use crate::message::Message;
use crate::track::{Trace, TrackKind};

type Callback<'a, T> = Box<dyn FnMut(&Message<T>) + Send + 'a>;

pub struct Puller<'a, T, B> {
    actor: &'a mut Actor<T, B>,
    callback: Option<Callback<'a, T>>,
    failures: Vec<ActorError>,
}

impl<'a, T, B> Puller<'a, T, B>
where
    T: Send + 'static,
    B: Behavior<T>,
{
    pub fn new(actor: &'a mut Actor<T, B>) -> Self {
        Self {
            actor,
            callback: None,
            failures: Vec::new(),
        }
    }

    /// Calls `callback` with every message right before it is worked.
    pub fn with_callback(mut self, callback: impl FnMut(&Message<T>) + Send + 'a) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Failures of every message worked by this Puller, oldest first.
    pub fn failures(&self) -> &[ActorError] {
        &self.failures
    }

    pub fn take_failures(&mut self) -> Vec<ActorError> {
        std::mem::take(&mut self.failures)
    }

    /// Processes up to `count` messages that are already queued. Returns how
    /// many were dequeued.
    pub async fn pull(&mut self, count: usize) -> usize {
        let mut handled = 0;
        while handled < count {
            let Some(message) = self.actor.receiver().try_recv() else {
                break;
            };
            self.dispatch(TrackKind::Pull, message).await;
            handled += 1;
        }
        debug!(actor = %self.actor.id(), requested = count, handled, "Pulled messages");
        handled
    }

    /// Processes queued messages until the mailbox is empty.
    pub async fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.actor.receiver().try_recv() {
            self.dispatch(TrackKind::Poll, message).await;
            handled += 1;
        }
        debug!(actor = %self.actor.id(), handled, "Polled messages");
        handled
    }

    /// Discards every queued message without handling it.
    pub fn wipe(&mut self) -> usize {
        let mut discarded = 0;
        while let Some(message) = self.actor.receiver().try_recv() {
            self.actor
                .track(&Trace::of(self.actor.id(), TrackKind::Wipe, &message));
            discarded += 1;
        }
        debug!(actor = %self.actor.id(), discarded, "Wiped mailbox");
        discarded
    }

    async fn dispatch(&mut self, kind: TrackKind, message: Message<T>) {
        self.actor.track(&Trace::of(self.actor.id(), kind, &message));
        if let Some(callback) = self.callback.as_mut() {
            callback(&message);
        }
        if let Err(err) = self.actor.work(message).await {
            self.failures.push(err);
        }
    }
}
