use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::state::StatusChange;

/// Outcome of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkResult {
    /// More work is pending for this worker
    More,
    /// Move on to the next item
    Next,
    /// The worker has finished for good; it is marked Completed
    Done,
    #[default]
    Unknown,
}

impl fmt::Display for WorkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkResult::More => write!(f, "more"),
            WorkResult::Next => write!(f, "next"),
            WorkResult::Done => write!(f, "done"),
            WorkResult::Unknown => write!(f, "unknown"),
        }
    }
}

/// A named unit of work inside a [`Group`](super::Group).
///
/// Workers of different types live in the same group, so the trait returns
/// boxed futures.
pub trait Worker<T: Send + 'static>: Send + 'static {
    fn work(&mut self, item: T) -> Pin<Box<dyn Future<Output = Result<WorkResult>> + Send + '_>>;

    /// Pulls a payload for this worker. `None` means nothing was available.
    fn resolve(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<T>>> + Send + '_>> {
        Box::pin(async { Ok(None) })
    }

    /// Called on every status change of this worker.
    fn changed(&mut self, _change: &StatusChange) {}
}

/// Worker built from an async closure. See [`worker_fn`].
pub struct WorkerFn<F> {
    f: F,
}

pub fn worker_fn<F>(f: F) -> WorkerFn<F> {
    WorkerFn { f }
}

impl<T, F, Fut> Worker<T> for WorkerFn<F>
where
    T: Send + 'static,
    F: FnMut(T) -> Fut + Send + 'static,
    Fut: Future<Output = Result<WorkResult>> + Send + 'static,
{
    fn work(&mut self, item: T) -> Pin<Box<dyn Future<Output = Result<WorkResult>> + Send + '_>> {
        Box::pin((self.f)(item))
    }
}
