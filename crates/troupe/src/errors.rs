use thiserror::Error;

use crate::action::Action;
use crate::status::Status;

/// # ActorError
///
/// Errors surfaced by the actor runtime and its handles.
///
/// Dropped messages are not errors: content arriving while the gate is closed,
/// or group content for an unknown worker, is discarded and only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActorError {
    /// The mailbox receiver is gone or the actor scope was closed
    #[error("Mailbox closed")]
    MailboxClosed,

    /// The action is not legal in the current status
    #[error("Action {action} is not allowed while {status}")]
    InvalidAction { action: Action, status: Status },

    /// A handler, resolver or worker returned an error
    #[error("Handler error: {0}")]
    Handler(String),

    /// A handler, resolver or worker panicked
    #[error("Handler panicked: {0}")]
    Panicked(String),
}
