//! Bounded FIFO work queue with acknowledgement and drain barrier.
//!
//! A slot is taken when an item is enqueued and only given back when a consumer
//! acknowledges it with `mark_done`, so at most `capacity` items are ever
//! enqueued-but-unacknowledged. `join` resolves once every enqueued item has
//! been acknowledged.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::{watch, Semaphore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// `mark_done` without a matching `dequeue`.
    #[error("mark_done called with no dequeued item outstanding")]
    UnmatchedAck,
    #[error("queue is closed")]
    Closed,
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    /// Dequeued but not yet acknowledged.
    in_flight: usize,
}

#[derive(Debug)]
pub struct WorkQueue<T> {
    capacity: usize,
    /// Free slots; held from `enqueue` until `mark_done`.
    slots: Semaphore,
    /// One permit per item waiting in `items`.
    ready: Semaphore,
    state: Mutex<State<T>>,
    /// Enqueued-but-unacknowledged count.
    unfinished: watch::Sender<usize>,
}

impl<T> WorkQueue<T> {
    /// Create a queue holding at most `capacity` unacknowledged items (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (unfinished, _) = watch::channel(0);
        Self {
            capacity,
            slots: Semaphore::new(capacity),
            ready: Semaphore::new(0),
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                in_flight: 0,
            }),
            unfinished,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items waiting to be dequeued.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items dequeued but not yet acknowledged.
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Items enqueued but not yet acknowledged (waiting + in flight).
    pub fn unfinished(&self) -> usize {
        *self.unfinished.borrow()
    }

    /// Append `item`, waiting while `capacity` items are unacknowledged.
    /// Fails only if the queue was closed.
    pub async fn enqueue(&self, item: T) -> Result<(), QueueError> {
        self.slots
            .acquire()
            .await
            .map_err(|_| QueueError::Closed)?
            .forget();
        self.lock().items.push_back(item);
        // Count before publishing so an ack can never run ahead of the increment.
        self.unfinished.send_modify(|n| *n += 1);
        self.ready.add_permits(1);
        Ok(())
    }

    /// Take the oldest item, waiting while the queue is empty.
    /// Returns `None` once the queue is closed. Cancel-safe: dropping the
    /// future before it resolves never loses an item.
    pub async fn dequeue(&self) -> Option<T> {
        self.ready.acquire().await.ok()?.forget();
        let mut state = self.lock();
        let item = state.items.pop_front();
        if item.is_some() {
            state.in_flight += 1;
        }
        item
    }

    /// Acknowledge one dequeued item, freeing its slot.
    pub fn mark_done(&self) -> Result<(), QueueError> {
        {
            let mut state = self.lock();
            if state.in_flight == 0 {
                return Err(QueueError::UnmatchedAck);
            }
            state.in_flight -= 1;
        }
        self.slots.add_permits(1);
        self.unfinished.send_modify(|n| *n = n.saturating_sub(1));
        Ok(())
    }

    /// Wait until every enqueued item has been acknowledged.
    pub async fn join(&self) {
        let mut rx = self.unfinished.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Reject further enqueues and wake blocked dequeuers with `None`.
    /// Items still waiting are dropped; call after `join`.
    pub fn close(&self) {
        self.slots.close();
        self.ready.close();
        let dropped = {
            let mut state = self.lock();
            let n = state.items.len();
            state.items.clear();
            n
        };
        if dropped > 0 {
            tracing::warn!(dropped, "queue closed with items still waiting");
            self.unfinished.send_modify(|n| *n = n.saturating_sub(dropped));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.ready.is_closed()
    }
}
