//! # Actions
//!
//! Control commands sent through an actor's mailbox. Each action is a pure
//! selector into the transition table: `Action::to_status(current)` never
//! depends on anything but the action and the current status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::status::Status;

/// # Action
///
/// Lifecycle command carried by a `Control` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Start,
    Pause,
    Resume,
    /// Moves back to InActive so a start can be scheduled later
    Delay,
    Stop,
    Kill,
    /// Pure probe, never changes the status
    Check,
    /// Marker, the status is owned by the caller context
    Process,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Start,
        Action::Pause,
        Action::Resume,
        Action::Delay,
        Action::Stop,
        Action::Kill,
        Action::Check,
        Action::Process,
    ];

    /// The status an actor in `current` moves to when it handles this action.
    pub fn to_status(self, current: Status) -> Status {
        match self {
            Action::Start => Status::Started,
            Action::Pause => Status::Paused,
            Action::Resume => Status::Running,
            Action::Delay => Status::InActive,
            Action::Stop => Status::Stopped,
            Action::Kill => Status::Killed,
            Action::Check => current,
            Action::Process => current,
        }
    }

    /// Probes leave the status untouched.
    pub fn is_probe(self) -> bool {
        matches!(self, Action::Check | Action::Process)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Start => "Start",
            Action::Pause => "Pause",
            Action::Resume => "Resume",
            Action::Delay => "Delay",
            Action::Stop => "Stop",
            Action::Kill => "Kill",
            Action::Check => "Check",
            Action::Process => "Process",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown action: {}", s))
    }
}
