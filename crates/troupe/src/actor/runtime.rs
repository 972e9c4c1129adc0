//! # Actor Runtime
//!
//! The consumer loop. Exactly one task drains an actor's mailbox, dispatches
//! each message by kind and is the only caller of the behavior, so handlers
//! never run concurrently with each other.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::action::Action;
use crate::config::{ActorConfig, FailurePolicy};
use crate::context::{Context, Scheduler};
use crate::errors::ActorError;
use crate::id::ActorId;
use crate::mailbox::{Mailbox, MailboxReceiver, WeakMailboxSender};
use crate::message::{Control, Message, MessageIds, MessageKind};
use crate::status::Status;
use crate::track::{LogTracker, Trace, TrackKind, Tracker};

use super::behavior::{Basic, Behavior, Managed, Producer};
use super::handle::ActorHandle;
use super::handler::{Handler, Resolver};

/// # Actor
///
/// One actor instance: its context, the receiving end of its mailbox and the
/// behavior messages are dispatched to.
///
/// Run it with [`run`](Self::run) / [`spawn`](Self::spawn), or drain it by
/// hand with a [`Puller`](crate::puller::Puller).
pub struct Actor<T, B> {
    context: Context,
    receiver: MailboxReceiver<T>,
    mailbox: WeakMailboxSender<T>,
    ids: Arc<MessageIds>,
    behavior: B,
    tracker: Arc<dyn Tracker>,
    failure: FailurePolicy,
    /// Cancels the pending scheduled control, if any
    follow_up: Option<CancellationToken>,
}

impl<T, H> Actor<T, Basic<H>>
where
    T: Send + 'static,
    H: Handler<T>,
{
    pub fn basic(context: Context, mailbox: Mailbox<T>, handler: H) -> (Self, ActorHandle<T>) {
        Self::new(context, mailbox, Basic::new(handler))
    }
}

impl<T, H> Actor<T, Managed<H>>
where
    T: Send + 'static,
    H: Handler<T>,
{
    pub fn managed(context: Context, mailbox: Mailbox<T>, handler: H, strict: bool) -> (Self, ActorHandle<T>) {
        Self::new(context, mailbox, Managed::new(handler, strict))
    }
}

impl<T, R> Actor<T, Producer<R>>
where
    T: Send + 'static,
    R: Resolver<T>,
{
    pub fn producer(context: Context, mailbox: Mailbox<T>, resolver: R, strict: bool) -> (Self, ActorHandle<T>) {
        Self::new(context, mailbox, Producer::new(resolver, strict))
    }
}

impl<T, B> Actor<T, B>
where
    T: Send + 'static,
    B: Behavior<T>,
{
    /// Creates an actor and the handle used to talk to it. The status starts
    /// at InActive.
    pub fn new(context: Context, mailbox: Mailbox<T>, behavior: B) -> (Self, ActorHandle<T>) {
        let (sender, receiver) = mailbox.split();
        let ids = Arc::new(MessageIds::new());
        let handle = ActorHandle::new(
            context.id().clone(),
            sender.clone(),
            context.state().clone(),
            ids.clone(),
            behavior.admission(),
            behavior.routes_targets(),
            context.scope().clone(),
        );
        let actor = Self {
            mailbox: sender.downgrade(),
            context,
            receiver,
            ids,
            behavior,
            tracker: Arc::new(LogTracker),
            failure: FailurePolicy::default(),
            follow_up: None,
        };
        (actor, handle)
    }

    /// Creates an actor from its configuration (identity, mailbox, scheduler
    /// and failure policy).
    pub fn from_config(config: &ActorConfig, behavior: B) -> (Self, ActorHandle<T>) {
        let (actor, handle) = Self::new(config.context(), config.mailbox(), behavior);
        (actor.with_failure_policy(config.failure), handle)
    }

    pub fn with_tracker(mut self, tracker: impl Tracker) -> Self {
        self.tracker = Arc::new(tracker);
        self
    }

    pub fn with_failure_policy(mut self, failure: FailurePolicy) -> Self {
        self.failure = failure;
        self
    }

    pub fn id(&self) -> &ActorId {
        self.context.id()
    }

    pub fn status(&self) -> Status {
        self.context.status()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub(crate) fn receiver(&mut self) -> &mut MailboxReceiver<T> {
        &mut self.receiver
    }

    pub(crate) fn track(&self, trace: &Trace<'_>) {
        self.tracker.track(trace);
    }

    /// Spawns the consumer loop on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drains the mailbox until every sender is gone or the scope is
    /// cancelled. A handler still in flight when the scope is cancelled is
    /// dropped at its next suspension point.
    pub async fn run(mut self) {
        let id = self.context.id().clone();
        let scope = self.context.scope().clone();
        info!(actor = %id, "Actor consumer loop starting");

        loop {
            let message = tokio::select! {
                biased;
                _ = scope.cancelled() => {
                    info!(actor = %id, "Actor scope cancelled");
                    break;
                }
                message = self.receiver.recv() => match message {
                    Some(message) => message,
                    None => {
                        info!(actor = %id, "Mailbox closed");
                        break;
                    }
                },
            };

            self.tracker.track(&Trace::of(&id, TrackKind::Work, &message));

            tokio::select! {
                biased;
                _ = scope.cancelled() => {
                    info!(actor = %id, "Actor scope cancelled while handling a message");
                    break;
                }
                // Failures were reported by `work`; the loop keeps going.
                _ = self.work(message) => {}
            }
        }

        self.receiver.close();
        info!(actor = %id, status = %self.status(), "Actor consumer loop exited");
    }

    /// Handles one message. Handler failures and panics are reported here
    /// (log, tracker, failure policy) and returned; they never escape as a
    /// panic.
    pub async fn work(&mut self, message: Message<T>) -> Result<(), ActorError> {
        match message {
            Message::Control(control) => {
                self.on_control(control).await;
                Ok(())
            }
            Message::Content(content) => {
                if !self.admits() {
                    debug!(actor = %self.id(), id = content.id, status = %self.status(), "Dropping content, actor not active");
                    return Ok(());
                }
                self.context.state().begin();
                let (id, target) = (content.id, content.target.clone());
                let result = guard(self.behavior.content(content, &self.context)).await;
                self.settle(id, MessageKind::Content, &target, result)
            }
            Message::Request(request) => {
                if !self.behavior.handles_requests() {
                    debug!(actor = %self.id(), id = request.id, "Ignoring request, behavior does not pull payloads");
                    return Ok(());
                }
                if !self.admits() {
                    debug!(actor = %self.id(), id = request.id, status = %self.status(), "Dropping request, actor not active");
                    return Ok(());
                }
                self.context.state().begin();
                let (id, target) = (request.id, request.target.clone());
                let result = guard(self.behavior.request(request, &self.context)).await;
                self.settle(id, MessageKind::Request, &target, result)
            }
        }
    }

    fn admits(&self) -> bool {
        self.behavior.gate().admits(self.status())
    }

    async fn on_control(&mut self, control: Control) {
        if !control.target.is_empty() && self.behavior.control_target(&control, &self.context) {
            return;
        }

        // A newer transition supersedes any scheduled control.
        if !control.action.is_probe() {
            if let Some(pending) = self.follow_up.take() {
                debug!(actor = %self.id(), action = %control.action, "Cancelling pending follow-up control");
                pending.cancel();
            }
        }

        let change = self.context.state().handle(control.action, control.note);
        info!(
            actor = %self.id(),
            action = %change.action,
            old = %change.old,
            new = %change.new,
            "Status changed"
        );

        if let Some((after, action)) = self.context.scheduler().and_then(|s| s.follow_up(control.action)) {
            debug!(actor = %self.id(), %action, ?after, "Scheduling follow-up control");
            let token = self.context.scope().child_token();
            self.follow_up = Some(token.clone());
            Scheduler::schedule(
                after,
                action,
                change.new,
                control.target,
                self.context.state().clone(),
                self.ids.clone(),
                self.mailbox.clone(),
                token,
            );
        }

        self.behavior.changed(&change, &self.context).await;
    }

    fn settle(
        &mut self,
        id: u64,
        kind: MessageKind,
        target: &str,
        result: Result<(), ActorError>,
    ) -> Result<(), ActorError> {
        let Err(err) = result else {
            return Ok(());
        };

        error!(actor = %self.id(), id, message = %kind, "Handling failed: {}", err);
        self.tracker
            .track(&Trace::failure(self.context.id(), id, kind, target, &err));

        match self.failure {
            FailurePolicy::Continue => {}
            FailurePolicy::Pause => {
                self.context
                    .state()
                    .force(Action::Pause, Some(err.to_string()));
            }
            FailurePolicy::Fail => {
                self.context.state().fail(err.to_string());
            }
        }
        Err(err)
    }
}

/// Runs a handler future, turning errors and panics into [`ActorError`].
pub(crate) async fn guard<F>(fut: F) -> Result<(), ActorError>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ActorError::Handler(format!("{:#}", e))),
        Err(panic) => Err(ActorError::Panicked(panic_message(panic.as_ref()))),
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
