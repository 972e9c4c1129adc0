//! # Actor archetypes
//!
//! Every actor runs the same consumer loop; what differs is its [`Behavior`]:
//! which gate applies to payloads, whether `Request` messages mean anything,
//! and where a payload ends up.
//!
//! * [`Basic`] hands every payload straight to its handler.
//! * [`Managed`] gates payloads on Started/Running, both before they reach the
//!   mailbox and again when they are dequeued.
//! * [`Producer`] pulls its own payloads when it receives a `Request`.
//! * [`Group`](crate::group::Group) fans payloads out to named workers.

use anyhow::Result;
use std::future::Future;
use tracing::debug;

use crate::context::Context;
use crate::message::{Content, Control, Request};
use crate::state::StatusChange;
use crate::status::Gate;

use super::handler::{Handler, Resolver};

/// Dispatch strategy plugged into an [`Actor`](super::Actor).
pub trait Behavior<T: Send + 'static>: Send + 'static {
    /// Gate applied when a payload or request is dequeued.
    fn gate(&self) -> Gate {
        Gate::Open
    }

    /// Gate applied by the handle before a payload is enqueued.
    fn admission(&self) -> Gate {
        Gate::Open
    }

    /// Whether `Request` messages are meaningful for this behavior.
    fn handles_requests(&self) -> bool {
        false
    }

    fn content(&mut self, content: Content<T>, context: &Context) -> impl Future<Output = Result<()>> + Send;

    fn request(&mut self, _request: Request, _context: &Context) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Whether targeted Controls go to sub-targets instead of the actor.
    fn routes_targets(&self) -> bool {
        false
    }

    /// Control addressed to a sub-target. Returning `false` applies it to the
    /// actor itself.
    fn control_target(&mut self, _control: &Control, _context: &Context) -> bool {
        false
    }

    /// Called after every own status transition handled from a Control.
    fn changed(&mut self, _change: &StatusChange, _context: &Context) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// # Basic
///
/// No lifecycle gating: every payload goes straight to the handler.
/// `Request` messages are ignored.
pub struct Basic<H> {
    handler: H,
}

impl<H> Basic<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<T, H> Behavior<T> for Basic<H>
where
    T: Send + 'static,
    H: Handler<T>,
{
    fn content(&mut self, content: Content<T>, context: &Context) -> impl Future<Output = Result<()>> + Send {
        self.handler.handle(content.data, context)
    }

    fn changed(&mut self, change: &StatusChange, context: &Context) -> impl Future<Output = ()> + Send {
        self.handler.changed(change, context)
    }
}

/// # Managed
///
/// Payloads sent while the actor is not Started/Running are refused before
/// they reach the mailbox. Payloads already queued when the actor leaves
/// Started/Running are dropped on dequeue. With `strict = false` both gates
/// are open.
pub struct Managed<H> {
    handler: H,
    strict: bool,
}

impl<H> Managed<H> {
    pub fn new(handler: H, strict: bool) -> Self {
        Self { handler, strict }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<T, H> Behavior<T> for Managed<H>
where
    T: Send + 'static,
    H: Handler<T>,
{
    fn gate(&self) -> Gate {
        Gate::from_strict(self.strict)
    }

    fn admission(&self) -> Gate {
        Gate::from_strict(self.strict)
    }

    fn content(&mut self, content: Content<T>, context: &Context) -> impl Future<Output = Result<()>> + Send {
        self.handler.handle(content.data, context)
    }

    fn changed(&mut self, change: &StatusChange, context: &Context) -> impl Future<Output = ()> + Send {
        self.handler.changed(change, context)
    }
}

/// # Producer
///
/// Has no externally supplied payloads: each `Request` asks the resolver for
/// one, which is then handled. Gated on dequeue like [`Managed`].
pub struct Producer<R> {
    resolver: R,
    strict: bool,
}

impl<R> Producer<R> {
    pub fn new(resolver: R, strict: bool) -> Self {
        Self { resolver, strict }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

impl<T, R> Behavior<T> for Producer<R>
where
    T: Send + 'static,
    R: Resolver<T>,
{
    fn gate(&self) -> Gate {
        Gate::from_strict(self.strict)
    }

    fn handles_requests(&self) -> bool {
        true
    }

    fn content(&mut self, content: Content<T>, context: &Context) -> impl Future<Output = Result<()>> + Send {
        self.resolver.handle(content.data, context)
    }

    fn request(&mut self, request: Request, context: &Context) -> impl Future<Output = Result<()>> + Send {
        async move {
            match self.resolver.resolve(&request, context).await? {
                Some(item) => self.resolver.handle(item, context).await,
                None => {
                    debug!(actor = %context.id(), request = request.id, "Nothing resolved for request");
                    Ok(())
                }
            }
        }
    }

    fn changed(&mut self, change: &StatusChange, context: &Context) -> impl Future<Output = ()> + Send {
        self.resolver.changed(change, context)
    }
}
