//! FIFO async lock that serializes rebuild checks.
//!
//! Operations are admitted one at a time, strictly in arrival order. The
//! [`LockGuard`] handed out by [`AsyncLock::acquire`] is the release handle:
//! consuming it with [`LockGuard::release`] (or dropping it) dispatches the
//! next queued waiter. Because the guard can only be consumed once, an
//! operation cannot release twice.
//!
//! There is no timeout and no cancellation of the running operation. An
//! operation that never releases blocks every later one.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use tokio::sync::oneshot;

/// Mutual-exclusion gate with strict FIFO hand-off.
///
/// Unlike a data mutex this guards no value; it orders *work*. Waiters are
/// parked on one-shot channels and woken in the order they arrived.
#[derive(Debug, Default)]
pub struct AsyncLock {
    state: Mutex<LockState>,
}

#[derive(Debug, Default)]
struct LockState {
    /// An operation is in flight.
    held: bool,
    /// Parked waiters, oldest first.
    queue: VecDeque<oneshot::Sender<()>>,
}

impl AsyncLock {
    /// Create an unlocked gate with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access.
    ///
    /// If the lock is free it is taken immediately, but the caller still
    /// yields once to the scheduler before proceeding so the operation never
    /// runs inside the caller's own poll. Otherwise the caller is queued and
    /// resumed when every earlier waiter has released.
    ///
    /// Dropping the returned future before it completes is safe: a waiter
    /// that was already handed the lock passes it on.
    pub async fn acquire(&self) -> LockGuard<'_> {
        let parked = {
            let mut state = self.state.lock();
            if state.held {
                let (tx, rx) = oneshot::channel();
                state.queue.push_back(tx);
                Some(rx)
            } else {
                state.held = true;
                None
            }
        };

        match parked {
            Some(rx) => {
                Waiter {
                    lock: self,
                    rx: Some(rx),
                }
                .granted()
                .await;
                LockGuard { lock: self }
            }
            None => {
                let guard = LockGuard { lock: self };
                tokio::task::yield_now().await;
                guard
            }
        }
    }

    /// Run `operation` under the lock, handing it the release handle.
    ///
    /// The operation is expected to release (or drop) the guard when its
    /// critical section is over; anything it does after that runs unlocked.
    pub async fn run<'a, F, Fut, T>(&'a self, operation: F) -> T
    where
        F: FnOnce(LockGuard<'a>) -> Fut,
        Fut: Future<Output = T>,
    {
        let guard = self.acquire().await;
        operation(guard).await
    }

    /// Whether an operation currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.state.lock().held
    }

    /// Number of live waiters queued behind the current holder.
    pub fn waiting(&self) -> usize {
        self.state
            .lock()
            .queue
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// Hand the lock to the oldest live waiter, or mark it free.
    fn release(&self) {
        let mut state = self.state.lock();
        while let Some(next) = state.queue.pop_front() {
            // A failed send means that waiter was cancelled; skip it.
            if next.send(()).is_ok() {
                return;
            }
        }
        state.held = false;
    }
}

/// Parked acquisition. Owns the receiving end until the lock is granted.
struct Waiter<'a> {
    lock: &'a AsyncLock,
    rx: Option<oneshot::Receiver<()>>,
}

impl Waiter<'_> {
    async fn granted(mut self) {
        if let Some(rx) = self.rx.as_mut() {
            // Senders only live in this lock's queue, which outlives us.
            let _ = rx.await;
        }
        self.rx = None;
    }
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            // Granted between wake-up and cancellation: pass it on.
            if rx.try_recv().is_ok() {
                self.lock.release();
            }
        }
    }
}

/// Exclusive access to an [`AsyncLock`]. Releases on drop.
#[must_use = "dropping the guard releases the lock immediately"]
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a AsyncLock,
}

impl LockGuard<'_> {
    /// Release the lock and dispatch the next queued operation.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
