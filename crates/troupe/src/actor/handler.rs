//! # Extension points
//!
//! What an implementer supplies to give an actor its behavior: a [`Handler`]
//! for payloads and, for self-pulling actors, a [`Resolver`] that turns a
//! `Request` into a payload.

use anyhow::Result;
use std::future::Future;

use crate::context::Context;
use crate::message::Request;
use crate::state::StatusChange;

/// Processes payloads. Only the actor's consumer loop ever calls `handle`, so
/// implementations need no locking of their own.
pub trait Handler<T>: Send + 'static {
    fn handle(&mut self, item: T, context: &Context) -> impl Future<Output = Result<()>> + Send;

    /// Called after every status transition the actor handles from a Control.
    fn changed(&mut self, _change: &StatusChange, _context: &Context) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// A handler that can also fetch its own payloads (e.g. from a queue).
pub trait Resolver<T>: Handler<T> {
    /// Resolves `request` into a payload. `None` means nothing was available.
    fn resolve(&mut self, request: &Request, context: &Context) -> impl Future<Output = Result<Option<T>>> + Send;
}

/// Handler built from an async closure. See [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

/// Wraps `f` as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn { f }
}

impl<T, F, Fut> Handler<T> for HandlerFn<F>
where
    T: Send + 'static,
    F: FnMut(T) -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn handle(&mut self, item: T, _context: &Context) -> impl Future<Output = Result<()>> + Send {
        (self.f)(item)
    }
}
