//! Turn gate: a polled critical section handed from stage to stage.
//!
//! The gate pairs one lock with the id of the stage allowed to hold it:
//! - `acquire(id)` takes the lock; if the turn is not `id` it lets go,
//!   sleeps `poll_interval` and tries again.
//! - `TurnPermit::release(next)` stores `next` and unlocks.
//!
//! Waiting for an id no one ever hands over polls forever (livelock).
//! The lock itself is only held for the duration of a check, so other
//! callers always make progress.

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::stage::TurnId;

/// Mutex-protected current turn.
pub struct TurnGate {
    turn: Mutex<TurnId>,
    poll_interval: Duration,
}

impl TurnGate {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Polls before a waiter is reported as possibly livelocked.
    const LIVELOCK_ALERT_POLLS: u64 = 1_000;

    pub fn new(initial: impl Into<TurnId>) -> Self {
        Self {
            turn: Mutex::new(initial.into()),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Wait until it is `id`'s turn and return with the lock held.
    pub async fn acquire(&self, id: impl Into<TurnId>) -> TurnPermit<'_> {
        let id = id.into();
        let mut polls: u64 = 0;

        loop {
            let guard = self.turn.lock().await;
            if *guard == id {
                tracing::debug!(turn = %id, polls, "Entered critical section");
                return TurnPermit {
                    id,
                    guard: Some(guard),
                    polls,
                };
            }
            drop(guard);

            polls += 1;
            if polls == Self::LIVELOCK_ALERT_POLLS {
                tracing::warn!(
                    turn = %id,
                    polls,
                    "Turn still not handed over - waiter may be livelocked"
                );
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Single non-blocking attempt. `None` if the lock is busy or it is not `id`'s turn.
    pub fn try_acquire(&self, id: impl Into<TurnId>) -> Option<TurnPermit<'_>> {
        let id = id.into();
        let guard = self.turn.try_lock().ok()?;
        if *guard != id {
            return None;
        }
        Some(TurnPermit {
            id,
            guard: Some(guard),
            polls: 0,
        })
    }

    /// Current turn, or `None` while someone holds the lock.
    pub fn current_turn(&self) -> Option<TurnId> {
        self.turn.try_lock().ok().map(|guard| *guard)
    }
}

/// Ownership of the critical section. Hand it on with [`TurnPermit::release`].
#[must_use = "a turn permit must be released to hand the turn to the next stage"]
pub struct TurnPermit<'a> {
    id: TurnId,
    guard: Option<MutexGuard<'a, TurnId>>,
    polls: u64,
}

impl TurnPermit<'_> {
    pub fn id(&self) -> TurnId {
        self.id
    }

    /// Number of failed attempts before this permit was granted.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Advance the turn to `next` and unlock.
    pub fn release(mut self, next: impl Into<TurnId>) {
        let next = next.into();
        if let Some(mut guard) = self.guard.take() {
            *guard = next;
            tracing::debug!(turn = %self.id, next = %next, "Released turn");
        }
    }
}

impl Drop for TurnPermit<'_> {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::error!(turn = %self.id, "TurnPermit dropped without release - turn not advanced");
        }
    }
}
