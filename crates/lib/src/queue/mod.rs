//! FIFO access queue serializing operations against the storage handle.
//!
//! Callers [`acquire`](AccessQueue::acquire) an [`AccessGuard`] and hold it
//! for the duration of one store operation. Grants follow arrival order and at
//! most one guard is current at any time.
//!
//! A holder that does not release within the waiting head's timeout is
//! pre-empted under [`StuckHolderPolicy::AdvanceOnTimeout`]: the head is granted
//! the lock and the stale guard's eventual release does nothing. The timeout is
//! measured from the moment a waiter becomes the head of the wait set.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::constants::DEFAULT_LOCK_TIMEOUT;

/// What the queue does when the holder outlives the head waiter's timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StuckHolderPolicy {
    /// Grant the head waiter regardless; the old holder's release becomes a no-op.
    #[default]
    AdvanceOnTimeout,
    /// Keep waiting for an explicit release. Logs once per stall.
    WaitForRelease,
}

#[derive(Debug)]
struct Waiter {
    ticket: u64,
    timeout: Duration,
}

#[derive(Debug, Default)]
struct QueueState {
    next_ticket: u64,
    holder: Option<u64>,
    waiters: VecDeque<Waiter>,
    /// When the front waiter became the head of the wait set.
    head_since: Option<Instant>,
    stall_reported: bool,
}

impl QueueState {
    fn set_head_since(&mut self, now: Instant) {
        self.head_since = if self.waiters.is_empty() {
            None
        } else {
            Some(now)
        };
        self.stall_reported = false;
    }
}

struct Shared {
    state: Mutex<QueueState>,
    notify: Notify,
    policy: StuckHolderPolicy,
    default_timeout: Duration,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deadline at which the head waiter may pre-empt the holder.
    ///
    /// `None` means wait for a notification only.
    fn head_deadline(&self, state: &QueueState) -> Option<Instant> {
        if state.holder.is_none() {
            return None;
        }
        if self.policy == StuckHolderPolicy::WaitForRelease && state.stall_reported {
            return None;
        }
        let head = state.waiters.front()?;
        state.head_since?.checked_add(head.timeout)
    }

    /// Applies the stuck-holder policy if the head's deadline has passed.
    fn expire_overdue(&self, state: &mut QueueState, now: Instant) {
        let Some(deadline) = self.head_deadline(state) else {
            return;
        };
        if now < deadline {
            return;
        }

        match self.policy {
            StuckHolderPolicy::AdvanceOnTimeout => {
                let Some(next) = state.waiters.pop_front() else {
                    return;
                };
                tracing::warn!(
                    preempted = state.holder,
                    granted = next.ticket,
                    timeout_ms = next.timeout.as_millis() as u64,
                    "Access queue holder did not release in time, advancing to next waiter"
                );
                state.holder = Some(next.ticket);
                state.set_head_since(now);
                self.notify.notify_waiters();
            }
            StuckHolderPolicy::WaitForRelease => {
                tracing::warn!(
                    holder = state.holder,
                    waiting = state.waiters.len(),
                    "Access queue holder has exceeded the waiter timeout, still waiting for release"
                );
                state.stall_reported = true;
            }
        }
    }

    fn release(&self, ticket: u64) -> bool {
        let mut state = self.state();
        if state.holder != Some(ticket) {
            tracing::debug!(
                ticket,
                holder = state.holder,
                "Ignoring release from a pre-empted access guard"
            );
            return false;
        }

        match state.waiters.pop_front() {
            Some(next) => {
                state.holder = Some(next.ticket);
                state.set_head_since(Instant::now());
            }
            None => {
                state.holder = None;
                state.head_since = None;
                state.stall_reported = false;
            }
        }
        drop(state);

        self.notify.notify_waiters();
        true
    }
}

/// Cheap-to-clone handle to a FIFO lock over one storage handle.
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use filefly::queue::{AccessQueue, StuckHolderPolicy};
///
/// let queue = AccessQueue::new(Duration::from_secs(5), StuckHolderPolicy::AdvanceOnTimeout);
/// let guard = queue.lock().await;
/// assert!(queue.is_current(&guard));
/// assert!(guard.release());
/// assert!(!queue.is_locked());
/// # }
/// ```
#[derive(Clone)]
pub struct AccessQueue {
    shared: Arc<Shared>,
}

impl Default for AccessQueue {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT, StuckHolderPolicy::default())
    }
}

impl fmt::Debug for AccessQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state();
        f.debug_struct("AccessQueue")
            .field("holder", &state.holder)
            .field("queued", &state.waiters.len())
            .field("policy", &self.shared.policy)
            .field("default_timeout", &self.shared.default_timeout)
            .finish()
    }
}

impl AccessQueue {
    /// Create an idle queue.
    ///
    /// `default_timeout` is used by [`lock`](Self::lock).
    pub fn new(default_timeout: Duration, policy: StuckHolderPolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::default()),
                notify: Notify::new(),
                policy,
                default_timeout,
            }),
        }
    }

    /// Stuck-holder policy of this queue.
    pub fn policy(&self) -> StuckHolderPolicy {
        self.shared.policy
    }

    /// Timeout used by [`lock`](Self::lock).
    pub fn default_timeout(&self) -> Duration {
        self.shared.default_timeout
    }

    /// Acquire the lock with the queue's default timeout.
    pub async fn lock(&self) -> AccessGuard {
        self.acquire(self.shared.default_timeout).await
    }

    /// Wait for the lock in arrival order.
    ///
    /// This never fails. If the current holder does not release within
    /// `timeout` of this caller reaching the head of the queue, the lock is
    /// handed over anyway (see [`StuckHolderPolicy`]).
    ///
    /// Dropping the returned future after it has been polled leaves its slot
    /// in the queue. The slot is granted and then expires like a stuck holder.
    pub async fn acquire(&self, timeout: Duration) -> AccessGuard {
        let ticket = {
            let mut state = self.shared.state();
            let ticket = state.next_ticket;
            state.next_ticket += 1;

            if state.holder.is_none() && state.waiters.is_empty() {
                state.holder = Some(ticket);
                return AccessGuard::new(Arc::clone(&self.shared), ticket);
            }

            if state.waiters.is_empty() {
                state.head_since = Some(Instant::now());
                state.stall_reported = false;
            }
            state.waiters.push_back(Waiter { ticket, timeout });
            ticket
        };

        tracing::trace!(ticket, "Queued for storage access");

        loop {
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a release in between is not missed.
            notified.as_mut().enable();

            let deadline = {
                let mut state = self.shared.state();
                self.shared.expire_overdue(&mut state, Instant::now());
                if state.holder == Some(ticket) {
                    return AccessGuard::new(Arc::clone(&self.shared), ticket);
                }
                self.shared.head_deadline(&state)
            };

            match deadline {
                Some(deadline) => {
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = tokio::time::sleep_until(deadline) => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Returns true if `guard` was issued by this queue and still holds the lock.
    pub fn is_current(&self, guard: &AccessGuard) -> bool {
        Arc::ptr_eq(&self.shared, &guard.shared)
            && self.shared.state().holder == Some(guard.ticket)
    }

    /// Number of callers waiting behind the current holder.
    pub fn queued(&self) -> usize {
        self.shared.state().waiters.len()
    }

    /// Returns true while some guard holds the lock.
    pub fn is_locked(&self) -> bool {
        self.shared.state().holder.is_some()
    }
}

/// Grant of an [`AccessQueue`].
///
/// Released by [`release`](Self::release) or on drop. Releasing a guard that
/// was pre-empted has no effect on the queue.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct AccessGuard {
    shared: Arc<Shared>,
    ticket: u64,
    released: bool,
}

impl AccessGuard {
    fn new(shared: Arc<Shared>, ticket: u64) -> Self {
        Self {
            shared,
            ticket,
            released: false,
        }
    }

    /// Arrival number of this grant. Lower tickets arrived earlier.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Release the lock and wake the next waiter.
    ///
    /// Returns false if this guard had already been pre-empted.
    pub fn release(mut self) -> bool {
        self.released = true;
        self.shared.release(self.ticket)
    }
}

impl Drop for AccessGuard {
    fn drop(&mut self) {
        if !self.released {
            self.shared.release(self.ticket);
        }
    }
}

impl fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGuard")
            .field("ticket", &self.ticket)
            .finish()
    }
}
