//! # Groups
//!
//! A [`Group`] is an actor behavior that fans payloads out to a table of
//! named [`Worker`]s. Each worker carries its own status in a [`WContext`],
//! tracked independently of the group's status:
//!
//! * Content and Request go to the worker named by their target, or to the
//!   first registered worker when they have none. Unknown targets are dropped.
//! * A targeted Control changes only the addressed worker.
//! * An untargeted Control changes the group and is fanned out to every
//!   worker (`Check` and `Process` excepted).
//! * A worker that fails is marked Failed; the group's own status is not
//!   touched.

mod worker;

pub use worker::{worker_fn, WorkResult, Worker, WorkerFn};

use anyhow::Result;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::actor::runtime::panic_message;
use crate::actor::Behavior;
use crate::context::Context;
use crate::id::ActorId;
use crate::message::{Content, Control, Request};
use crate::state::{validate, StatusChange};
use crate::status::{Status, StatusCell};

/// # WContext
///
/// A worker paired with its own atomic status.
pub struct WContext<T: Send + 'static> {
    name: String,
    worker: Box<dyn Worker<T>>,
    status: Arc<StatusCell>,
}

impl<T: Send + 'static> WContext<T> {
    pub fn new(name: impl Into<String>, worker: impl Worker<T>) -> Self {
        Self {
            name: name.into(),
            worker: Box::new(worker),
            status: Arc::new(StatusCell::new(Status::InActive)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> Status {
        self.status.get()
    }

    /// Applies `action` to this worker's status through the transition table.
    ///
    /// Returns `None` when the worker's own status does not allow `action`.
    fn apply(&mut self, actor: &ActorId, action: Action, note: Option<String>) -> Option<StatusChange> {
        if !validate(self.status(), action) {
            warn!(actor = %actor, worker = %self.name, %action, status = %self.status(), "Rejected invalid action for worker");
            return None;
        }
        let (old, new) = self.status.update(|current| action.to_status(current));
        let change = StatusChange::new(actor.clone(), self.name.as_str(), action, old, new).with_note(note);
        self.worker.changed(&change);
        Some(change)
    }

    /// Sets a status no action maps to (Running, Completed, Failed).
    fn mark(&mut self, actor: &ActorId, status: Status, note: Option<String>) {
        let old = self.status.set(status);
        let change =
            StatusChange::new(actor.clone(), self.name.as_str(), Action::Process, old, status).with_note(note);
        self.worker.changed(&change);
    }

    async fn run(&mut self, actor: &ActorId, item: T) {
        if self.status.transition(Status::Started, Status::Running) {
            let change = StatusChange::new(
                actor.clone(),
                self.name.as_str(),
                Action::Process,
                Status::Started,
                Status::Running,
            );
            self.worker.changed(&change);
        }

        let outcome = match AssertUnwindSafe(self.worker.work(item)).catch_unwind().await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(panic) => Err(panic_message(panic.as_ref())),
        };

        match outcome {
            Ok(WorkResult::Done) => {
                debug!(actor = %actor, worker = %self.name, "Worker done");
                self.mark(actor, Status::Completed, None);
            }
            Ok(result) => {
                debug!(actor = %actor, worker = %self.name, %result, "Worker finished item");
            }
            Err(e) => {
                error!(actor = %actor, worker = %self.name, "Worker failed: {}", e);
                self.mark(actor, Status::Failed, Some(e));
            }
        }
    }

    async fn resolve(&mut self, actor: &ActorId) -> Option<T> {
        match AssertUnwindSafe(self.worker.resolve()).catch_unwind().await {
            Ok(Ok(item)) => item,
            Ok(Err(e)) => {
                let e = format!("{:#}", e);
                error!(actor = %actor, worker = %self.name, "Worker failed to resolve: {}", e);
                self.mark(actor, Status::Failed, Some(e));
                None
            }
            Err(panic) => {
                let e = panic_message(panic.as_ref());
                error!(actor = %actor, worker = %self.name, "Worker panicked while resolving: {}", e);
                self.mark(actor, Status::Failed, Some(e));
                None
            }
        }
    }
}

/// # WorkerBoard
///
/// Read-only view of every worker's status, usable after the group has been
/// moved into its actor.
#[derive(Debug, Clone, Default)]
pub struct WorkerBoard {
    cells: Arc<Vec<(String, Arc<StatusCell>)>>,
}

impl WorkerBoard {
    pub fn status(&self, name: &str) -> Option<Status> {
        self.cells
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cell)| cell.get())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(n, _)| n.as_str())
    }

    pub fn snapshot(&self) -> Vec<(String, Status)> {
        self.cells
            .iter()
            .map(|(n, cell)| (n.clone(), cell.get()))
            .collect()
    }
}

/// # Group
///
/// Dispatch table of named workers. With `strict` set, a worker only receives
/// work while it is itself Started or Running.
pub struct Group<T: Send + 'static> {
    workers: Vec<WContext<T>>,
    index: HashMap<String, usize>,
    strict: bool,
}

impl<T: Send + 'static> Default for Group<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Group<T> {
    pub fn new() -> Self {
        Self {
            workers: Vec::new(),
            index: HashMap::new(),
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn worker(mut self, name: impl Into<String>, worker: impl Worker<T>) -> Self {
        self.register(name, worker);
        self
    }

    /// Registers `worker` under `name`, replacing any worker already there.
    pub fn register(&mut self, name: impl Into<String>, worker: impl Worker<T>) {
        let name = name.into();
        let context = WContext::new(name.clone(), worker);
        match self.index.get(&name) {
            Some(&i) => {
                warn!(worker = %name, "Replacing registered worker");
                self.workers[i] = context;
            }
            None => {
                self.index.insert(name, self.workers.len());
                self.workers.push(context);
            }
        }
    }

    pub fn board(&self) -> WorkerBoard {
        WorkerBoard {
            cells: Arc::new(
                self.workers
                    .iter()
                    .map(|w| (w.name.clone(), w.status.clone()))
                    .collect(),
            ),
        }
    }

    pub fn status(&self, name: &str) -> Option<Status> {
        self.index.get(name).map(|&i| self.workers[i].status())
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// The worker addressed by `target`; the first worker when there is none.
    fn lookup(&mut self, target: &str) -> Option<&mut WContext<T>> {
        if target.is_empty() {
            return self.workers.first_mut();
        }
        let i = *self.index.get(target)?;
        self.workers.get_mut(i)
    }

    fn ready(&mut self, actor: &ActorId, target: &str) -> Option<&mut WContext<T>> {
        let strict = self.strict;
        let Some(worker) = self.lookup(target) else {
            warn!(actor = %actor, target, "No worker registered for target, dropping");
            return None;
        };
        if strict && !worker.status().is_active() {
            debug!(actor = %actor, worker = %worker.name, status = %worker.status(), "Worker not active, dropping");
            return None;
        }
        Some(worker)
    }
}

impl<T: Send + 'static> Behavior<T> for Group<T> {
    fn handles_requests(&self) -> bool {
        true
    }

    fn content(&mut self, content: Content<T>, context: &Context) -> impl Future<Output = Result<()>> + Send {
        async move {
            if let Some(worker) = self.ready(context.id(), &content.target) {
                worker.run(context.id(), content.data).await;
            }
            Ok(())
        }
    }

    fn request(&mut self, request: Request, context: &Context) -> impl Future<Output = Result<()>> + Send {
        async move {
            let actor = context.id();
            let Some(worker) = self.ready(actor, &request.target) else {
                return Ok(());
            };
            match worker.resolve(actor).await {
                Some(item) => worker.run(actor, item).await,
                None => debug!(actor = %actor, worker = %worker.name, "Nothing resolved for request"),
            }
            Ok(())
        }
    }

    fn routes_targets(&self) -> bool {
        true
    }

    fn control_target(&mut self, control: &Control, context: &Context) -> bool {
        match self.index.get(&control.target) {
            Some(&i) => {
                let Some(change) = self.workers[i].apply(context.id(), control.action, control.note.clone()) else {
                    return true;
                };
                info!(
                    actor = %context.id(),
                    worker = %change.target,
                    action = %change.action,
                    old = %change.old,
                    new = %change.new,
                    "Worker status changed"
                );
            }
            None => {
                warn!(actor = %context.id(), target = %control.target, "No worker registered for control target, dropping");
            }
        }
        true
    }

    fn changed(&mut self, change: &StatusChange, context: &Context) -> impl Future<Output = ()> + Send {
        if !change.action.is_probe() {
            for worker in &mut self.workers {
                worker.apply(context.id(), change.action, change.note.clone());
            }
        }
        async {}
    }
}
