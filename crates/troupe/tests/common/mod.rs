#![allow(dead_code)]

use anyhow::{bail, Result};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use troupe::{ActorHandle, Context, Handler, Request, Resolver, Status};

/// How long a test waits for the consumer loop before giving up
pub const SETTLE: Duration = Duration::from_secs(2);

/// Everything a [`Recorder`] has handled: the payload and the status the
/// actor was in when `handle` began.
pub type Seen = Arc<Mutex<Vec<(u32, Status)>>>;

/// Handler that records every payload. Payloads listed in `fail_on` make it
/// return an error, and `panic_on` makes it panic.
#[derive(Default)]
pub struct Recorder {
    pub seen: Seen,
    pub fail_on: Vec<u32>,
    pub panic_on: Vec<u32>,
}

impl Recorder {
    pub fn new() -> (Self, Seen) {
        let recorder = Self::default();
        let seen = recorder.seen.clone();
        (recorder, seen)
    }

    pub fn failing_on(mut self, item: u32) -> Self {
        self.fail_on.push(item);
        self
    }

    pub fn panicking_on(mut self, item: u32) -> Self {
        self.panic_on.push(item);
        self
    }
}

impl Handler<u32> for Recorder {
    fn handle(&mut self, item: u32, context: &Context) -> impl Future<Output = Result<()>> + Send {
        self.seen.lock().unwrap().push((item, context.status()));
        let fail = self.fail_on.contains(&item);
        let panic = self.panic_on.contains(&item);
        async move {
            if panic {
                panic!("panicked on {}", item);
            }
            if fail {
                bail!("failed on {}", item);
            }
            Ok(())
        }
    }
}

/// Resolver that pulls payloads from an in-memory queue.
pub struct QueueSource {
    pub queue: Arc<Mutex<VecDeque<u32>>>,
    pub recorder: Recorder,
}

impl QueueSource {
    pub fn new(items: impl IntoIterator<Item = u32>) -> (Self, Seen) {
        let (recorder, seen) = Recorder::new();
        let source = Self {
            queue: Arc::new(Mutex::new(items.into_iter().collect())),
            recorder,
        };
        (source, seen)
    }
}

impl Handler<u32> for QueueSource {
    fn handle(&mut self, item: u32, context: &Context) -> impl Future<Output = Result<()>> + Send {
        self.recorder.handle(item, context)
    }
}

impl Resolver<u32> for QueueSource {
    fn resolve(&mut self, _request: &Request, _context: &Context) -> impl Future<Output = Result<Option<u32>>> + Send {
        let next = self.queue.lock().unwrap().pop_front();
        async move { Ok(next) }
    }
}

pub fn items(seen: &Seen) -> Vec<u32> {
    seen.lock().unwrap().iter().map(|(item, _)| *item).collect()
}

/// Waits for `status`, failing the test if it is not reached in time.
pub async fn settle<T>(handle: &ActorHandle<T>, status: Status) {
    tokio::time::timeout(SETTLE, handle.wait_for(status))
        .await
        .unwrap_or_else(|_| panic!("actor never reached {}, stuck at {}", status, handle.status()));
}

/// Waits until `seen` holds `count` entries.
pub async fn seen_len(seen: &Seen, count: usize) {
    tokio::time::timeout(SETTLE, async {
        while seen.lock().unwrap().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("handler saw {:?}, expected {} items", items(seen), count));
}
