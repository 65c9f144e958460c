use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use playrec_protocols::{CapturedStep, StepType};

fn step(index: usize) -> Step {
    CapturedStep::new(StepType::Click, format!("#b{}", index)).accept(index, index as u64, 0)
}

#[test]
fn test_fifo_order() {
    let queue = StepQueue::new();
    for i in 0..3 {
        queue.push(step(i));
    }

    let mut ticket = queue.try_acquire().unwrap();
    let order: Vec<usize> = std::iter::from_fn(|| ticket.next()).map(|s| s.step_index).collect();
    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn test_second_acquire_is_refused() {
    let queue = StepQueue::new();
    let ticket = queue.try_acquire();
    assert!(ticket.is_some());
    assert!(queue.try_acquire().is_none());
    assert!(queue.is_active());

    drop(ticket);
    assert!(!queue.is_active());
    assert!(queue.try_acquire().is_some());
}

#[test]
fn test_running_dry_releases_guard() {
    let queue = StepQueue::new();
    queue.push(step(0));

    let mut ticket = queue.try_acquire().unwrap();
    assert!(ticket.next().is_some());
    assert!(queue.is_active());
    assert!(ticket.next().is_none());
    assert!(!queue.is_active());

    // A step pushed after the release is taken by a fresh drain.
    queue.push(step(1));
    let mut fresh = queue.try_acquire().unwrap();
    assert_eq!(fresh.next().unwrap().step_index, 1);
}

#[test]
fn test_step_pushed_mid_drain_is_not_lost() {
    let queue = StepQueue::new();
    queue.push(step(0));

    let mut ticket = queue.try_acquire().unwrap();
    assert_eq!(ticket.next().unwrap().step_index, 0);

    queue.push(step(1));
    assert!(queue.try_acquire().is_none());
    assert_eq!(ticket.next().unwrap().step_index, 1);
    assert!(ticket.next().is_none());
}

#[test]
fn test_reset_supersedes_ticket() {
    let queue = StepQueue::new();
    queue.push(step(0));
    queue.push(step(1));

    let mut old = queue.try_acquire().unwrap();
    assert!(old.is_current());
    assert_eq!(queue.reset(), 2);

    assert!(!old.is_current());
    assert!(!queue.is_active());
    assert!(queue.is_empty());

    // A new session's drain is not blocked by the stale ticket.
    queue.push(step(0));
    let mut fresh = queue.try_acquire().unwrap();
    assert!(old.next().is_none());
    drop(old);
    assert!(queue.is_active());
    assert_eq!(fresh.next().unwrap().step_index, 0);
    assert_eq!(fresh.epoch(), queue.epoch());
}

#[test]
fn test_discard_clears_pending() {
    let queue = StepQueue::new();
    queue.push(step(0));
    queue.push(step(1));

    let ticket = queue.try_acquire().unwrap();
    assert_eq!(ticket.discard(), 2);
    assert!(queue.is_empty());
    assert!(!queue.is_active());
}

#[tokio::test]
async fn test_wait_idle_returns_when_idle() {
    let queue = StepQueue::new();
    tokio::time::timeout(Duration::from_secs(1), queue.wait_idle())
        .await
        .expect("idle queue should not block");
}

#[tokio::test]
async fn test_wait_idle_wakes_after_drain() {
    let queue = Arc::new(StepQueue::new());
    queue.push(step(0));
    let mut ticket = queue.try_acquire().unwrap();
    ticket.next();
    std::mem::forget(ticket);

    let waiter = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.wait_idle().await })
    };
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());

    queue.reset();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("reset should wake waiters")
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_drain_under_concurrent_enqueue() {
    let queue = Arc::new(StepQueue::new());
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));
    let processed = Arc::new(AtomicUsize::new(0));

    let mut producers = Vec::new();
    for p in 0..8 {
        let queue = queue.clone();
        let active = active.clone();
        let max_active = max_active.clone();
        let processed = processed.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..25 {
                queue.push(step(p * 100 + i));
                let Some(mut ticket) = queue.try_acquire() else {
                    continue;
                };
                while ticket.next().is_some() {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    processed.fetch_add(1, Ordering::SeqCst);
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            }
        }));
    }
    for producer in futures::future::join_all(producers).await {
        producer.unwrap();
    }

    assert_eq!(max_active.load(Ordering::SeqCst), 1);
    assert_eq!(processed.load(Ordering::SeqCst), 200);
    assert!(queue.is_empty());
    assert!(!queue.is_active());
}
