//! Step processing queue.
//!
//! Pending steps wait here in arrival order until the single drain worker
//! takes them. Holding a [`DrainTicket`] is the only way to take steps, and
//! at most one ticket exists at a time, so at most one generation is in
//! flight. [`StepQueue::reset`] starts a new epoch: pending steps are
//! dropped and tickets of the old epoch stop yielding.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use playrec_protocols::Step;

#[derive(Default)]
struct QueueInner {
    pending: VecDeque<Step>,
    active: bool,
    epoch: u64,
}

#[derive(Default)]
pub struct StepQueue {
    inner: Mutex<QueueInner>,
    idle: Notify,
}

impl StepQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, step: Step) {
        self.inner.lock().pending.push_back(step);
    }

    /// Take the re-entrancy guard. `None` while another drain is running.
    pub fn try_acquire(&self) -> Option<DrainTicket<'_>> {
        let mut inner = self.inner.lock();
        if inner.active {
            return None;
        }
        inner.active = true;
        Some(DrainTicket {
            queue: self,
            epoch: inner.epoch,
            released: false,
        })
    }

    /// Drop pending steps and release the guard. Returns how many were dropped.
    pub fn reset(&self) -> usize {
        let dropped = {
            let mut inner = self.inner.lock();
            inner.epoch += 1;
            inner.active = false;
            let dropped = inner.pending.len();
            inner.pending.clear();
            dropped
        };
        self.idle.notify_waiters();
        dropped
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a drain currently holds the guard.
    pub fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    fn is_busy(&self) -> bool {
        let inner = self.inner.lock();
        inner.active || !inner.pending.is_empty()
    }

    /// Resolve once nothing is pending and no drain is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if !self.is_busy() {
                return;
            }
            notified.await;
        }
    }
}

/// The queue's re-entrancy guard. Released when the queue runs dry, on
/// reset, or when dropped.
pub struct DrainTicket<'a> {
    queue: &'a StepQueue,
    epoch: u64,
    released: bool,
}

impl DrainTicket<'_> {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether no reset happened since the ticket was taken.
    pub fn is_current(&self) -> bool {
        !self.released && self.queue.inner.lock().epoch == self.epoch
    }

    /// Pop the oldest pending step.
    ///
    /// When nothing is pending the guard is released in the same critical
    /// section, so a step pushed right after is picked up by a new drain.
    pub fn next(&mut self) -> Option<Step> {
        if self.released {
            return None;
        }
        let step = {
            let mut inner = self.queue.inner.lock();
            if inner.epoch != self.epoch {
                debug!("Drain of epoch {} superseded", self.epoch);
                self.released = true;
                return None;
            }
            let step = inner.pending.pop_front();
            if step.is_none() {
                inner.active = false;
                self.released = true;
            }
            step
        };
        if step.is_none() {
            self.queue.idle.notify_waiters();
        }
        step
    }

    /// Drop what is still pending and release the guard.
    pub fn discard(mut self) -> usize {
        let dropped = {
            let mut inner = self.queue.inner.lock();
            if inner.epoch != self.epoch {
                0
            } else {
                inner.active = false;
                let dropped = inner.pending.len();
                inner.pending.clear();
                dropped
            }
        };
        self.released = true;
        self.queue.idle.notify_waiters();
        dropped
    }
}

impl Drop for DrainTicket<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        {
            let mut inner = self.queue.inner.lock();
            if inner.epoch == self.epoch {
                inner.active = false;
            }
        }
        self.queue.idle.notify_waiters();
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
