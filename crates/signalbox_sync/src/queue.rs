//! # Blocking Queue
//!
//! Unbounded multi-producer/multi-consumer handoff buffer.
//!
//! ## Architecture
//!
//! ```text
//!   Producer 1 ──┐                                  ┌──> Receiver 1
//!   Producer 2 ──┼──> [Mutex<VecDeque>] + Condvar ──┼──> Receiver 2
//!   Producer N ──┘      (push_back, notify_one)     └──> Receiver M
//!                                                     (wait while empty)
//! ```
//!
//! Every element is removed under the lock by exactly one receiver, so no
//! value is ever delivered twice or lost. Receivers re-check the buffer
//! after every wake, which makes spurious wakeups harmless.
//!
//! ## Delivery Order
//!
//! The default order is [`DeliveryOrder::Lifo`]: a receiver always gets the
//! most recently sent element. For state updates only the newest value
//! matters, and stale values left behind are skipped by callers that loop
//! until they see the value they want. [`DeliveryOrder::Fifo`] is available
//! for consumers that need strict arrival order.

use crate::error::{SyncError, SyncResult};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Order in which buffered elements are handed to receivers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeliveryOrder {
    /// Most recently sent element first (stack discipline).
    #[default]
    Lifo,
    /// Oldest element first (queue discipline).
    Fifo,
}

/// State guarded by the queue mutex.
struct QueueState<T> {
    /// Pending elements, newest at the back.
    buffer: VecDeque<T>,
    /// Set once by `close`, never cleared.
    closed: bool,
    /// Receivers currently parked on the condvar.
    waiting: usize,
}

impl<T> QueueState<T> {
    #[inline]
    fn pop(&mut self, order: DeliveryOrder) -> Option<T> {
        match order {
            DeliveryOrder::Lifo => self.buffer.pop_back(),
            DeliveryOrder::Fifo => self.buffer.pop_front(),
        }
    }
}

/// Thread-safe blocking queue.
///
/// `send` never blocks (the buffer is unbounded). `receive` parks the
/// calling thread until an element is available, then moves exactly one
/// element out to the caller.
///
/// Share it between threads with an `Arc`.
///
/// ## Usage
///
/// ```rust,ignore
/// let queue = Arc::new(BlockingQueue::new());
///
/// let rx = Arc::clone(&queue);
/// let consumer = thread::spawn(move || rx.receive());
///
/// queue.send(42)?;
/// assert_eq!(consumer.join().unwrap()?, 42);
/// ```
pub struct BlockingQueue<T> {
    /// Buffer and bookkeeping, only touched under the lock.
    state: Mutex<QueueState<T>>,
    /// Signalled on every send and on close.
    not_empty: Condvar,
    /// Removal order, fixed at construction.
    order: DeliveryOrder,
}

impl<T> BlockingQueue<T> {
    /// Creates an empty LIFO queue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(DeliveryOrder::Lifo)
    }

    /// Creates an empty queue with the given delivery order.
    #[must_use]
    pub fn with_order(order: DeliveryOrder) -> Self {
        Self {
            state: Mutex::new(QueueState {
                buffer: VecDeque::new(),
                closed: false,
                waiting: 0,
            }),
            not_empty: Condvar::new(),
            order,
        }
    }

    /// Returns the delivery order.
    #[inline]
    #[must_use]
    pub fn order(&self) -> DeliveryOrder {
        self.order
    }

    /// Appends `value` and wakes one blocked receiver.
    ///
    /// Never blocks on capacity.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Closed`] if the queue has been closed. The value
    /// is dropped.
    pub fn send(&self, value: T) -> SyncResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SyncError::Closed);
        }
        state.buffer.push_back(value);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks until an element is available and returns it.
    ///
    /// The thread is parked on a condition variable while the buffer is
    /// empty; it does not spin.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Closed`] once the queue is closed and every
    /// remaining element has been handed out.
    pub fn receive(&self) -> SyncResult<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.pop(self.order) {
                return Ok(value);
            }
            if state.closed {
                return Err(SyncError::Closed);
            }
            state.waiting += 1;
            self.not_empty.wait(&mut state);
            state.waiting -= 1;
        }
    }

    /// Blocks for at most `timeout` waiting for an element.
    ///
    /// Returns `Ok(None)` if the deadline passes with the buffer still
    /// empty. Spurious wakeups do not extend the total wait.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Closed`] once the queue is closed and drained.
    pub fn receive_timeout(&self, timeout: Duration) -> SyncResult<Option<T>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.receive().map(Some);
        };

        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.pop(self.order) {
                return Ok(Some(value));
            }
            if state.closed {
                return Err(SyncError::Closed);
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            state.waiting += 1;
            let _ = self.not_empty.wait_until(&mut state, deadline);
            state.waiting -= 1;
        }
    }

    /// Removes an element without blocking.
    #[must_use]
    pub fn try_receive(&self) -> Option<T> {
        self.state.lock().pop(self.order)
    }

    /// Closes the queue and wakes every blocked receiver.
    ///
    /// Elements already buffered can still be received. Returns the number
    /// of receivers that were blocked when the queue was closed.
    pub fn close(&self) -> usize {
        let mut state = self.state.lock();
        let already_closed = std::mem::replace(&mut state.closed, true);
        let waiting = state.waiting;
        self.not_empty.notify_all();

        if !already_closed {
            tracing::trace!(waiting, pending = state.buffer.len(), "queue closed");
        }
        waiting
    }

    /// Returns true once `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Returns the number of buffered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// Returns true if no elements are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    /// Returns the number of receivers currently blocked.
    #[must_use]
    pub fn waiting_receivers(&self) -> usize {
        self.state.lock().waiting
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BlockingQueue")
            .field("order", &self.order)
            .field("len", &state.buffer.len())
            .field("waiting", &state.waiting)
            .field("closed", &state.closed)
            .finish()
    }
}
