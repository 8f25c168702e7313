//! Bounded blocking FIFO shared by all producers and consumers
//!
//! A `VecDeque` behind one mutex plus two condition variables (`not_empty`,
//! `not_full`). Every blocking call takes the caller's
//! [`CancellationToken`] and re-checks it under the lock before each wait;
//! whoever cancels a token must then call [`BoundedQueue::wake_all`] so the
//! parked waiter observes it.

use crate::core::shutdown::CancellationToken;
use crate::core::sync::{handle_mutex_poison, lock_recovering};
use crate::pipeline::error::{PipelineError, PipelineResult};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    /// Largest length ever observed
    peak: usize,
}

/// Fixed-capacity FIFO with blocking `put`/`take` and bounded-wait `poll`
#[derive(Debug)]
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` elements (`capacity >= 1`)
    pub fn new(capacity: usize) -> PipelineResult<Self> {
        if capacity == 0 {
            return Err(PipelineError::construction(
                "queue capacity must be at least 1",
            ));
        }

        Ok(Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                peak: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        lock_recovering(&self.state, "bounded queue").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest number of elements the queue has held at once
    pub fn peak_len(&self) -> usize {
        lock_recovering(&self.state, "bounded queue").peak
    }

    fn lock(&self) -> PipelineResult<MutexGuard<'_, QueueState<T>>> {
        handle_mutex_poison(self.state.lock(), PipelineError::synchronisation)
    }

    /// Append `item`, blocking while the queue is full
    ///
    /// Returns [`PipelineError::Interrupted`] if `cancel` is (or becomes)
    /// cancelled before the item is stored; the item is dropped in that case.
    pub fn put(&self, item: T, cancel: &CancellationToken) -> PipelineResult<()> {
        let mut state = self.lock()?;
        loop {
            if cancel.is_cancelled() {
                return Err(PipelineError::Interrupted);
            }
            if state.items.len() < self.capacity {
                break;
            }
            state =
                handle_mutex_poison(self.not_full.wait(state), PipelineError::synchronisation)?;
        }

        state.items.push_back(item);
        state.peak = state.peak.max(state.items.len());
        drop(state);

        // notify_all: a woken waiter may be cancelled and leave without
        // taking the element, so waking a single thread could strand it
        self.not_empty.notify_all();
        Ok(())
    }

    /// Remove the head element, blocking while the queue is empty
    pub fn take(&self, cancel: &CancellationToken) -> PipelineResult<T> {
        let mut state = self.lock()?;
        loop {
            if cancel.is_cancelled() {
                return Err(PipelineError::Interrupted);
            }
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_all();
                return Ok(item);
            }
            state =
                handle_mutex_poison(self.not_empty.wait(state), PipelineError::synchronisation)?;
        }
    }

    /// Remove the head element, waiting at most `timeout`
    ///
    /// `Ok(None)` means the deadline passed with the queue still empty.
    pub fn poll(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> PipelineResult<Option<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock()?;
        loop {
            if cancel.is_cancelled() {
                return Err(PipelineError::Interrupted);
            }
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_all();
                return Ok(Some(item));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let (guard, _timeout) = handle_mutex_poison(
                self.not_empty.wait_timeout(state, deadline - now),
                PipelineError::synchronisation,
            )?;
            state = guard;
        }
    }

    /// Wake every thread blocked in `put`, `take` or `poll`
    ///
    /// Waiters re-check their cancellation token and the queue state, so
    /// this is harmless for waiters that were not cancelled.
    pub fn wake_all(&self) {
        let _guard = lock_recovering(&self.state, "bounded queue");
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}

/// Type-erased access to [`BoundedQueue::wake_all`]
///
/// Lets a shutdown handle release blocked waiters without knowing the
/// element type.
pub trait WakeWaiters: Send + Sync {
    fn wake_all(&self);
}

impl<T: Send> WakeWaiters for BoundedQueue<T> {
    fn wake_all(&self) {
        BoundedQueue::wake_all(self);
    }
}
