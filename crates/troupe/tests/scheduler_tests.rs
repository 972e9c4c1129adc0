mod common;

use pretty_assertions::assert_eq;
use std::time::Duration;
use troupe::{Action, Actor, Context, Mailbox, Puller, Scheduler, Status};

use common::{settle, Recorder};

fn scheduled(name: &str, scheduler: Scheduler) -> Context {
    Context::new(name).with_scheduler(scheduler)
}

#[test_log::test(tokio::test)]
async fn test_delay_schedules_start() {
    let (recorder, _seen) = Recorder::new();
    let context = scheduled("delayed", Scheduler::new(Duration::from_millis(50)));
    let (actor, handle) = Actor::managed(context, Mailbox::unbounded(), recorder, true);
    let mut events = handle.subscribe();
    let task = actor.spawn();

    handle.delay().await.unwrap();
    settle(&handle, Status::Started).await;

    let delay = events.recv().await.unwrap();
    assert_eq!(delay.new, Status::InActive);
    let start = events.recv().await.unwrap();
    assert_eq!((start.old, start.new), (Status::InActive, Status::Started));
    assert!(start.note.unwrap().starts_with("scheduled after"));

    handle.close();
    task.await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_pause_schedules_resume() {
    let (recorder, _seen) = Recorder::new();
    let scheduler = Scheduler::new(Duration::from_secs(30)).resume_after(Duration::from_millis(50));
    let (actor, handle) = Actor::basic(scheduled("resumed", scheduler), Mailbox::unbounded(), recorder);
    let mut events = handle.subscribe();
    let task = actor.spawn();

    handle.start().await.unwrap();
    handle.pause().await.unwrap();

    let actions: Vec<_> = [
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
    ]
    .into_iter()
    .map(|change| (change.action, change.new))
    .collect();
    assert_eq!(
        actions,
        vec![
            (Action::Start, Status::Started),
            (Action::Pause, Status::Paused),
            (Action::Resume, Status::Running),
        ]
    );

    handle.close();
    task.await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_pause_without_resume_after_stays_paused() {
    let (recorder, _seen) = Recorder::new();
    let context = scheduled("paused", Scheduler::new(Duration::from_millis(10)));
    let (mut actor, handle) = Actor::basic(context, Mailbox::unbounded(), recorder);

    handle.pause().await.unwrap();
    Puller::new(&mut actor).poll().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(Puller::new(&mut actor).poll().await, 0);
    assert_eq!(handle.status(), Status::Paused);
}

#[test_log::test(tokio::test)]
async fn test_delay_without_scheduler_stays_inactive() {
    let (recorder, _seen) = Recorder::new();
    let (mut actor, handle) = Actor::basic(Context::new("plain"), Mailbox::unbounded(), recorder);

    handle.start().await.unwrap();
    handle.delay().await.unwrap();
    Puller::new(&mut actor).poll().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(Puller::new(&mut actor).poll().await, 0);
    assert_eq!(handle.status(), Status::InActive);
}

#[test_log::test(tokio::test)]
async fn test_closing_scope_drops_scheduled_start() {
    let (recorder, _seen) = Recorder::new();
    let context = scheduled("cancelled", Scheduler::new(Duration::from_millis(50)));
    let (mut actor, handle) = Actor::basic(context, Mailbox::unbounded(), recorder);

    handle.start().await.unwrap();
    handle.delay().await.unwrap();
    Puller::new(&mut actor).poll().await;
    assert_eq!(handle.status(), Status::InActive);

    handle.close();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(Puller::new(&mut actor).poll().await, 0);
    assert_eq!(handle.status(), Status::InActive);
}

#[test_log::test(tokio::test)]
async fn test_scheduled_start_arrives_in_mailbox() {
    let (recorder, _seen) = Recorder::new();
    let context = scheduled("mailbox", Scheduler::new(Duration::from_millis(20)));
    let (mut actor, handle) = Actor::basic(context, Mailbox::unbounded(), recorder);

    handle.delay().await.unwrap();
    Puller::new(&mut actor).poll().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(Puller::new(&mut actor).poll().await, 1);
    assert_eq!(handle.status(), Status::Started);
}

#[test_log::test(tokio::test)]
async fn test_kill_cancels_scheduled_start() {
    let (recorder, _seen) = Recorder::new();
    let context = scheduled("killed", Scheduler::new(Duration::from_millis(30)));
    let (mut actor, handle) = Actor::basic(context, Mailbox::unbounded(), recorder);

    handle.delay().await.unwrap();
    handle.kill().await.unwrap();
    assert_eq!(Puller::new(&mut actor).poll().await, 2);
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(Puller::new(&mut actor).poll().await, 0);
    assert_eq!(handle.status(), Status::Killed);
    assert!(handle.start().await.is_err());
}

#[test_log::test(tokio::test)]
async fn test_forced_kill_drops_scheduled_start() {
    let (recorder, _seen) = Recorder::new();
    let context = scheduled("forced", Scheduler::new(Duration::from_millis(30)));
    let (mut actor, handle) = Actor::basic(context, Mailbox::unbounded(), recorder);

    handle.delay().await.unwrap();
    Puller::new(&mut actor).poll().await;
    handle.force(Action::Kill);
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(Puller::new(&mut actor).poll().await, 0);
    assert_eq!(handle.status(), Status::Killed);
}

#[test_log::test(tokio::test)]
async fn test_stale_resume_does_not_end_later_pause() {
    let (recorder, _seen) = Recorder::new();
    let scheduler = Scheduler::new(Duration::from_secs(30)).resume_after(Duration::from_millis(200));
    let (mut actor, handle) = Actor::basic(scheduled("repaused", scheduler), Mailbox::unbounded(), recorder);

    handle.start().await.unwrap();
    handle.pause().await.unwrap();
    Puller::new(&mut actor).poll().await;
    assert_eq!(handle.status(), Status::Paused);

    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.resume().await.unwrap();
    handle.pause().await.unwrap();
    Puller::new(&mut actor).poll().await;

    // The first pause's timer has expired by now; the second has not.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(Puller::new(&mut actor).poll().await, 0);
    assert_eq!(handle.status(), Status::Paused);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(Puller::new(&mut actor).poll().await, 1);
    assert_eq!(handle.status(), Status::Running);
}
