//! # Actor Handle
//!
//! This module provides the `ActorHandle` type, the caller-side interface of an
//! actor: lifecycle commands, payload sends and synchronous status reads.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::Action;
use crate::errors::ActorError;
use crate::id::ActorId;
use crate::mailbox::MailboxSender;
use crate::message::{Message, MessageIds, Receipt, NO_TARGET};
use crate::state::{validate, State, StatusChange};
use crate::status::{Gate, Status};

/// # ActorHandle
///
/// A cloneable handle to one actor.
///
/// ## Purpose
///
/// Every command goes through the actor's mailbox, so lifecycle commands and
/// payloads sent from one handle are handled in exactly the order they were
/// sent. The only exceptions are [`status`](Self::status), which reads the
/// shared status cell directly, and [`force`](Self::force), which writes it
/// directly and so bypasses that ordering.
#[derive(Debug)]
pub struct ActorHandle<T> {
    id: ActorId,
    sender: MailboxSender<T>,
    state: Arc<State>,
    ids: Arc<MessageIds>,
    admission: Gate,
    /// Targeted Controls go to sub-targets, not to this actor
    routes: bool,
    scope: CancellationToken,
}

impl<T> Clone for ActorHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            sender: self.sender.clone(),
            state: self.state.clone(),
            ids: self.ids.clone(),
            admission: self.admission,
            routes: self.routes,
            scope: self.scope.clone(),
        }
    }
}

impl<T> ActorHandle<T> {
    pub(crate) fn new(
        id: ActorId,
        sender: MailboxSender<T>,
        state: Arc<State>,
        ids: Arc<MessageIds>,
        admission: Gate,
        routes: bool,
        scope: CancellationToken,
    ) -> Self {
        Self {
            id,
            sender,
            state,
            ids,
            admission,
            routes,
            scope,
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Current status. Never waits on the consumer loop.
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Status once every Control already sent through a handle is handled.
    pub fn expected(&self) -> Status {
        self.state.expected()
    }

    /// Whether `action` may be issued now. Once Killed, or with a Kill already
    /// on its way, only `Check` is legal.
    pub fn validate(&self, action: Action) -> bool {
        self.state.validate(action) && validate(self.state.expected(), action)
    }

    /// Runs `op` if the gate selected by `strict` admits the current status.
    pub fn allow<R>(&self, strict: bool, op: impl FnOnce() -> R) -> Option<R> {
        if Gate::from_strict(strict).admits(self.status()) {
            Some(op())
        } else {
            None
        }
    }

    /// Changes the status immediately, without going through the mailbox.
    ///
    /// Messages already queued are handled under the forced status, so
    /// payloads accepted before a forced Stop are dropped at dequeue.
    pub fn force(&self, action: Action) -> StatusChange {
        self.state.force(action, Some("forced".to_string()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.state.subscribe()
    }

    /// Waits until the actor reaches `status`.
    pub async fn wait_for(&self, status: Status) {
        self.state.wait_for(status).await
    }

    /// Cancels the actor's scope. The consumer loop exits at its next
    /// suspension point and scheduled controls are dropped.
    pub fn close(&self) {
        debug!(actor = %self.id, "Closing actor scope");
        self.scope.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.scope.is_cancelled() || self.sender.is_closed()
    }

    /// Sends a Control for `action`, after checking it with [`validate`](Self::validate).
    pub async fn control(&self, action: Action, note: Option<String>, target: &str) -> Result<(), ActorError> {
        if !self.validate(action) {
            warn!(actor = %self.id, %action, status = %self.status(), "Rejected invalid action");
            return Err(ActorError::InvalidAction {
                action,
                status: self.status(),
            });
        }
        let message = Message::control(self.ids.next(), action, note, target);
        self.sender.send(message).await?;
        if target.is_empty() || !self.routes {
            self.state.issue(action);
        }
        Ok(())
    }

    pub async fn start(&self) -> Result<(), ActorError> {
        self.control(Action::Start, None, NO_TARGET).await
    }

    pub async fn pause(&self) -> Result<(), ActorError> {
        self.control(Action::Pause, None, NO_TARGET).await
    }

    pub async fn resume(&self) -> Result<(), ActorError> {
        self.control(Action::Resume, None, NO_TARGET).await
    }

    pub async fn stop(&self) -> Result<(), ActorError> {
        self.control(Action::Stop, None, NO_TARGET).await
    }

    pub async fn kill(&self) -> Result<(), ActorError> {
        self.control(Action::Kill, None, NO_TARGET).await
    }

    pub async fn delay(&self) -> Result<(), ActorError> {
        self.control(Action::Delay, None, NO_TARGET).await
    }

    pub async fn check(&self) -> Result<(), ActorError> {
        self.control(Action::Check, None, NO_TARGET).await
    }

    /// Sends a payload. Managed actors refuse it with [`Receipt::Rejected`]
    /// unless the [`expected`](Self::expected) status is Started/Running, and
    /// it never reaches the mailbox. The status at dequeue still decides
    /// whether an accepted payload is handled.
    pub async fn send(&self, item: T) -> Result<Receipt, ActorError> {
        self.send_to(item, NO_TARGET).await
    }

    /// Sends a payload addressed to a named sub-target.
    pub async fn send_to(&self, item: T, target: &str) -> Result<Receipt, ActorError> {
        let expected = self.state.expected();
        if !self.admission.admits(expected) {
            debug!(actor = %self.id, status = %expected, "Payload refused by admission gate");
            return Ok(Receipt::Rejected);
        }
        let message = Message::content(self.ids.next(), item, target);
        self.sender.send(message).await?;
        Ok(Receipt::Accepted)
    }

    /// Asks the actor to pull a payload itself.
    pub async fn request(&self) -> Result<(), ActorError> {
        self.request_to(NO_TARGET).await
    }

    /// Asks the actor to pull a payload for a named sub-target.
    pub async fn request_to(&self, target: &str) -> Result<(), ActorError> {
        let message = Message::request(self.ids.next(), target);
        self.sender.send(message).await
    }
}
