mod common;

use pretty_assertions::assert_eq;
use troupe::{Action, Actor, Context, Mailbox, Puller, Status};

use common::QueueSource;

#[test_log::test(tokio::test)]
async fn test_requests_pull_from_source() {
    let (source, seen) = QueueSource::new([10, 20]);
    let (mut actor, handle) = Actor::producer(Context::new("producer"), Mailbox::unbounded(), source, true);

    handle.start().await.unwrap();
    handle.request().await.unwrap();
    handle.request().await.unwrap();
    // Nothing left to resolve.
    handle.request().await.unwrap();

    assert_eq!(Puller::new(&mut actor).poll().await, 4);
    assert_eq!(*seen.lock().unwrap(), vec![(10, Status::Running), (20, Status::Running)]);
    assert_eq!(handle.status(), Status::Running);
}

#[test_log::test(tokio::test)]
async fn test_strict_producer_drops_requests_until_started() {
    let (source, seen) = QueueSource::new([1, 2]);
    let queue = source.queue.clone();
    let (mut actor, handle) = Actor::producer(Context::new("gated"), Mailbox::unbounded(), source, true);

    handle.request().await.unwrap();
    Puller::new(&mut actor).poll().await;
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(queue.lock().unwrap().len(), 2);

    handle.force(Action::Start);
    handle.request_to("ignored-target").await.unwrap();
    Puller::new(&mut actor).poll().await;
    assert_eq!(common::items(&seen), vec![1]);
}

#[test_log::test(tokio::test)]
async fn test_lenient_producer_runs_while_inactive() {
    let (source, seen) = QueueSource::new([5]);
    let (actor, handle) = Actor::producer(Context::new("lenient"), Mailbox::unbounded(), source, false);
    let task = actor.spawn();

    handle.request().await.unwrap();
    drop(handle);
    task.await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![(5, Status::InActive)]);
}

#[test_log::test(tokio::test)]
async fn test_producer_still_handles_content() {
    let (source, seen) = QueueSource::new(Vec::new());
    let (mut actor, handle) = Actor::producer(Context::new("content"), Mailbox::unbounded(), source, true);

    handle.force(Action::Start);
    handle.send(3).await.unwrap();
    Puller::new(&mut actor).poll().await;
    assert_eq!(common::items(&seen), vec![3]);
}
