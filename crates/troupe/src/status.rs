//! # Actor Status
//!
//! The lifecycle state of an actor, plus the lock-free cell it is stored in.
//!
//! A status has no implicit ordering: every move between statuses is driven by
//! the transition table on [`Action`](crate::Action). `InActive` is the only
//! status an actor is created with. `Killed` and `Completed` are terminal by
//! convention.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// # Status
///
/// Enumerated lifecycle state of an actor or of a worker inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Status {
    /// Created but not yet started (or delayed)
    #[default]
    InActive = 0,
    /// Accepted a start, nothing processed yet
    Started = 1,
    /// Waiting on an external condition
    Waiting = 2,
    /// Actively processing content
    Running = 3,
    /// Temporarily not processing
    Paused = 4,
    /// Stopped, can be resumed
    Stopped = 5,
    /// Finished all of its work
    Completed = 6,
    /// Failed while processing
    Failed = 7,
    /// Killed, only `Check` is allowed afterwards
    Killed = 8,
}

impl Status {
    /// All statuses in declaration order.
    pub const ALL: [Status; 9] = [
        Status::InActive,
        Status::Started,
        Status::Waiting,
        Status::Running,
        Status::Paused,
        Status::Stopped,
        Status::Completed,
        Status::Failed,
        Status::Killed,
    ];

    /// Whether content may be processed in this status when gating is strict.
    pub fn is_active(self) -> bool {
        matches!(self, Status::Started | Status::Running)
    }

    /// Whether no action is defined to leave this status (besides `Check`).
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Killed | Status::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::InActive => "InActive",
            Status::Started => "Started",
            Status::Waiting => "Waiting",
            Status::Running => "Running",
            Status::Paused => "Paused",
            Status::Stopped => "Stopped",
            Status::Completed => "Completed",
            Status::Failed => "Failed",
            Status::Killed => "Killed",
        }
    }

    fn from_u8(value: u8) -> Status {
        match value {
            1 => Status::Started,
            2 => Status::Waiting,
            3 => Status::Running,
            4 => Status::Paused,
            5 => Status::Stopped,
            6 => Status::Completed,
            7 => Status::Failed,
            8 => Status::Killed,
            _ => Status::InActive,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown status: {}", s))
    }
}

/// # StatusCell
///
/// Atomically stored [`Status`]. Any task may read it at any time without
/// synchronizing with the actor's consumer loop.
#[derive(Debug, Default)]
pub struct StatusCell {
    value: AtomicU8,
}

impl StatusCell {
    pub fn new(status: Status) -> Self {
        Self {
            value: AtomicU8::new(status as u8),
        }
    }

    pub fn get(&self) -> Status {
        Status::from_u8(self.value.load(Ordering::Acquire))
    }

    /// Stores `status` and returns the previous one.
    pub fn set(&self, status: Status) -> Status {
        Status::from_u8(self.value.swap(status as u8, Ordering::AcqRel))
    }

    /// Atomically replaces the current status with `f(current)`.
    ///
    /// Returns `(old, new)`.
    pub fn update(&self, f: impl Fn(Status) -> Status) -> (Status, Status) {
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            let old = Status::from_u8(current);
            let new = f(old);
            match self.value.compare_exchange_weak(
                current,
                new as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return (old, new),
                Err(actual) => current = actual,
            }
        }
    }

    /// Moves `from` to `to` only if the cell currently holds `from`.
    pub fn transition(&self, from: Status, to: Status) -> bool {
        self.value
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// # Gate
///
/// Policy deciding whether content may be processed in the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    /// Always allow
    #[default]
    Open,
    /// Only allow while Started or Running
    Strict,
}

impl Gate {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Gate::Strict
        } else {
            Gate::Open
        }
    }

    pub fn admits(self, status: Status) -> bool {
        match self {
            Gate::Open => true,
            Gate::Strict => status.is_active(),
        }
    }
}
