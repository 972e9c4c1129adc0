//! # Actors
//!
//! An actor is a mailbox, a status and a behavior. Callers talk to it through
//! an [`ActorHandle`]; a single consumer loop ([`Actor::run`]) drains the
//! mailbox and dispatches each message to the [`Behavior`].

pub mod behavior;
pub mod handle;
pub mod handler;
pub mod runtime;

// Public re-exports
pub use behavior::{Basic, Behavior, Managed, Producer};
pub use handle::ActorHandle;
pub use handler::{handler_fn, Handler, HandlerFn, Resolver};
pub use runtime::Actor;
