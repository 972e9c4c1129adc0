mod common;

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use troupe::{
    worker_fn, Action, Actor, Context, Group, Mailbox, Puller, Receipt, Status, StatusChange, WorkResult, Worker,
    NO_TARGET,
};

type Calls = Arc<Mutex<Vec<(String, u32)>>>;

fn named(name: &'static str, calls: Calls) -> impl Worker<u32> {
    worker_fn(move |item: u32| {
        let calls = calls.clone();
        async move {
            calls.lock().unwrap().push((name.to_string(), item));
            Ok::<_, anyhow::Error>(WorkResult::Next)
        }
    })
}

/// Worker that pulls from its own backlog and records lifecycle changes.
struct Backlog {
    items: Vec<u32>,
    done: Arc<Mutex<Vec<u32>>>,
    changes: Arc<Mutex<Vec<(Action, Status)>>>,
}

impl Worker<u32> for Backlog {
    fn work(&mut self, item: u32) -> Pin<Box<dyn Future<Output = Result<WorkResult>> + Send + '_>> {
        Box::pin(async move {
            self.done.lock().unwrap().push(item);
            if self.items.is_empty() {
                Ok(WorkResult::Done)
            } else {
                Ok(WorkResult::More)
            }
        })
    }

    fn resolve(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<u32>>> + Send + '_>> {
        Box::pin(async move { Ok(self.items.pop()) })
    }

    fn changed(&mut self, change: &StatusChange) {
        self.changes.lock().unwrap().push((change.action, change.new));
    }
}

#[test_log::test(tokio::test)]
async fn test_group_dispatches_by_target() {
    let calls = Calls::default();
    let group = Group::new()
        .worker("a", named("a", calls.clone()))
        .worker("b", named("b", calls.clone()));
    let (mut actor, handle) = Actor::new(Context::new("group"), Mailbox::unbounded(), group);

    assert_eq!(handle.send_to(1, "a").await.unwrap(), Receipt::Accepted);
    assert_eq!(handle.send_to(1, "c").await.unwrap(), Receipt::Accepted);
    Puller::new(&mut actor).poll().await;

    assert_eq!(*calls.lock().unwrap(), vec![("a".to_string(), 1)]);
}

#[test_log::test(tokio::test)]
async fn test_unknown_target_reaches_no_worker() {
    let calls = Calls::default();
    let group = Group::new().worker("w2", named("w2", calls.clone()));
    let (mut actor, handle) = Actor::new(Context::new("group"), Mailbox::unbounded(), group);

    handle.send_to(1, "w1").await.unwrap();
    handle.request_to("w1").await.unwrap();
    Puller::new(&mut actor).poll().await;

    assert!(calls.lock().unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_untargeted_content_goes_to_first_worker() {
    let calls = Calls::default();
    let group = Group::new()
        .worker("first", named("first", calls.clone()))
        .worker("second", named("second", calls.clone()));
    let (mut actor, handle) = Actor::new(Context::new("group"), Mailbox::unbounded(), group);

    handle.send(7).await.unwrap();
    Puller::new(&mut actor).poll().await;

    assert_eq!(*calls.lock().unwrap(), vec![("first".to_string(), 7)]);
}

#[test_log::test(tokio::test)]
async fn test_controls_fan_out_and_target() {
    let calls = Calls::default();
    let group = Group::new()
        .strict(true)
        .worker("a", named("a", calls.clone()))
        .worker("b", named("b", calls.clone()));
    let board = group.board();
    let (mut actor, handle) = Actor::new(Context::new("group"), Mailbox::unbounded(), group);

    handle.start().await.unwrap();
    handle.control(Action::Pause, None, "b").await.unwrap();
    handle.send_to(1, "a").await.unwrap();
    handle.send_to(2, "b").await.unwrap();
    handle.check().await.unwrap();
    Puller::new(&mut actor).poll().await;

    assert_eq!(handle.status(), Status::Running);
    assert_eq!(
        board.snapshot(),
        vec![("a".to_string(), Status::Running), ("b".to_string(), Status::Paused)]
    );
    assert_eq!(*calls.lock().unwrap(), vec![("a".to_string(), 1)]);

    handle.stop().await.unwrap();
    Puller::new(&mut actor).poll().await;
    assert_eq!(board.status("a"), Some(Status::Stopped));
    assert_eq!(board.status("b"), Some(Status::Stopped));
}

#[test_log::test(tokio::test)]
async fn test_worker_resolves_own_payloads_until_done() {
    let done = Arc::new(Mutex::new(Vec::new()));
    let changes = Arc::new(Mutex::new(Vec::new()));
    let backlog = Backlog {
        items: vec![2, 1],
        done: done.clone(),
        changes: changes.clone(),
    };
    let group = Group::new().worker("backlog", backlog);
    let board = group.board();
    let (mut actor, handle) = Actor::new(Context::new("group"), Mailbox::unbounded(), group);

    handle.control(Action::Start, None, "backlog").await.unwrap();
    handle.request_to("backlog").await.unwrap();
    handle.request_to("backlog").await.unwrap();
    handle.request_to("backlog").await.unwrap();
    Puller::new(&mut actor).poll().await;

    assert_eq!(*done.lock().unwrap(), vec![1, 2]);
    assert_eq!(board.status("backlog"), Some(Status::Completed));
    assert_eq!(
        *changes.lock().unwrap(),
        vec![
            (Action::Start, Status::Started),
            (Action::Process, Status::Running),
            (Action::Process, Status::Completed),
        ]
    );
    // The group itself was never started.
    assert_eq!(handle.status(), Status::InActive);
}

#[test_log::test(tokio::test)]
async fn test_worker_failure_stays_with_worker() {
    let group = Group::new()
        .worker("broken", worker_fn(|_item: u32| async { Err::<WorkResult, _>(anyhow::anyhow!("boom")) }))
        .worker("fine", worker_fn(|_item: u32| async { Ok::<_, anyhow::Error>(WorkResult::Next) }));
    let board = group.board();
    let (mut actor, handle) = Actor::new(Context::new("group"), Mailbox::unbounded(), group);

    handle.control(Action::Start, None, NO_TARGET).await.unwrap();
    handle.send_to(1, "broken").await.unwrap();
    handle.send_to(1, "fine").await.unwrap();
    Puller::new(&mut actor).poll().await;

    assert_eq!(board.status("broken"), Some(Status::Failed));
    assert_eq!(board.status("fine"), Some(Status::Running));
    assert_eq!(handle.status(), Status::Running);
}
