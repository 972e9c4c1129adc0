//! # Actor Context
//!
//! Identity, concurrency scope and optional scheduler of one actor. A context
//! is owned by exactly one actor and handed to its handlers by reference.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::action::Action;
use crate::id::ActorId;
use crate::mailbox::WeakMailboxSender;
use crate::message::{Message, MessageIds};
use crate::state::State;
use crate::status::Status;

/// Default wait before a delayed actor is started again.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(30);

/// # Scheduler
///
/// Timings for follow-up Control messages the actor sends to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    /// After a `Delay`, send `Start` once this has elapsed
    pub delay: Duration,
    /// After a `Pause`, send `Resume` once this has elapsed
    pub resume_after: Option<Duration>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            resume_after: None,
        }
    }
}

impl Scheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            resume_after: None,
        }
    }

    pub fn resume_after(mut self, after: Duration) -> Self {
        self.resume_after = Some(after);
        self
    }

    /// The follow-up for a handled action, if any.
    pub fn follow_up(&self, action: Action) -> Option<(Duration, Action)> {
        match action {
            Action::Delay => Some((self.delay, Action::Start)),
            Action::Pause => self.resume_after.map(|after| (after, Action::Resume)),
            _ => None,
        }
    }

    /// Sends `action` to the mailbox after `after`, unless `scope` is
    /// cancelled first or the mailbox is gone by then.
    ///
    /// The control is only sent while the actor is still in `from`, the status
    /// the scheduling transition left it in, and `action` is still legal.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn schedule<T: Send + 'static>(
        after: Duration,
        action: Action,
        from: Status,
        target: String,
        state: Arc<State>,
        ids: Arc<MessageIds>,
        mailbox: WeakMailboxSender<T>,
        scope: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = scope.cancelled() => {
                    debug!(%action, "Scheduled control cancelled");
                }
                _ = tokio::time::sleep(after) => {
                    let status = state.status();
                    if status != from || !state.validate(action) {
                        debug!(%action, %status, expected = %from, "Status moved on, dropping scheduled control");
                        return;
                    }
                    let Some(sender) = mailbox.upgrade() else {
                        debug!(%action, "Mailbox gone before scheduled control");
                        return;
                    };
                    let note = Some(format!("scheduled after {:?}", after));
                    if sender.send(Message::control(ids.next(), action, note, target)).await.is_err() {
                        debug!(%action, "Mailbox closed before scheduled control");
                        return;
                    }
                    state.issue(action);
                }
            }
        })
    }
}

/// # Context
///
/// Immutable identity plus the scope the consumer loop and any scheduled
/// callbacks run under. Cancelling the scope is the only teardown path.
#[derive(Debug)]
pub struct Context {
    id: ActorId,
    scope: CancellationToken,
    scheduler: Option<Scheduler>,
    state: Arc<State>,
}

impl Context {
    pub fn new(id: impl Into<ActorId>) -> Self {
        Self::with_scope(id, CancellationToken::new())
    }

    /// A context whose lifetime is tied to `scope`. Pass a child token to
    /// have a parent scope tear the actor down.
    pub fn with_scope(id: impl Into<ActorId>, scope: CancellationToken) -> Self {
        let id = id.into();
        Self {
            state: Arc::new(State::new(id.clone())),
            id,
            scope,
            scheduler: None,
        }
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub fn state(&self) -> &Arc<State> {
        &self.state
    }

    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.scope.is_cancelled()
    }
}
