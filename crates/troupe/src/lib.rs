//! # Troupe
//!
//! Troupe is a small actor library for tokio. Each actor owns one ordered,
//! single-consumer mailbox and a lifecycle status that any task can read
//! without waiting on the actor.
//!
//! ## Core Features
//!
//! * **Mailbox**: Control, Content and Request messages share one FIFO queue,
//!   unbounded by default or bounded with backpressure
//! * **Lifecycle**: A pure transition table drives the status through
//!   InActive, Started, Running, Paused, Stopped, Killed, Completed and Failed
//! * **Archetypes**: Basic, Managed (gated on Started/Running), Producer
//!   (pulls its own payloads) and Group (fans out to named workers)
//! * **Manual draining**: `Puller` processes queued messages on the caller's
//!   task
//!
//! ## Architecture
//!
//! * `Actor`: The consumer loop, the only caller of an actor's behavior
//! * `ActorHandle`: Sends commands and payloads, reads the status
//! * `State`: The shared status cell and the code allowed to change it
//! * `Behavior`: Gating and dispatch strategy of an archetype
//!
//! ## Example Usage
//!
//! ```no_run
//! use troupe::{handler_fn, Actor, Context, Mailbox, Status};
//!
//! # async fn demo() -> Result<(), troupe::ActorError> {
//! let handler = handler_fn(|n: u32| async move {
//!     println!("got {}", n);
//!     Ok::<(), anyhow::Error>(())
//! });
//! let (actor, handle) = Actor::managed(Context::new("printer"), Mailbox::unbounded(), handler, true);
//! actor.spawn();
//!
//! handle.start().await?;
//! handle.wait_for(Status::Started).await;
//! handle.send(42).await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod actor;
pub mod config;
pub mod context;
pub mod errors;
pub mod group;
pub mod id;
pub mod logging;
pub mod mailbox;
pub mod message;
pub mod puller;
pub mod state;
pub mod status;
pub mod track;

pub use action::Action;
pub use actor::{handler_fn, Actor, ActorHandle, Basic, Behavior, Handler, Managed, Producer, Resolver};
pub use config::{ActorConfig, FailurePolicy, LogOutput, LoggingConfig, MailboxConfig, SchedulerConfig};
pub use context::{Context, Scheduler};
pub use errors::ActorError;
pub use group::{worker_fn, Group, WContext, WorkResult, Worker, WorkerBoard};
pub use id::ActorId;
pub use logging::setup_global_logging;
pub use mailbox::{Mailbox, MailboxReceiver, MailboxSender};
pub use message::{Content, Control, Message, MessageKind, Receipt, Request, NO_TARGET};
pub use puller::Puller;
pub use state::{State, StatusChange};
pub use status::{Gate, Status, StatusCell};
pub use track::{LogTracker, Trace, TrackKind, Tracker};
