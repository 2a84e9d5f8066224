//! Unbounded multi-producer, single-consumer event queue
//!
//! Funnels events from every connection handler into the single
//! dispatcher task. The queue stays open while at least one [`Sender`]
//! is alive; once the last one is dropped and the backlog is drained,
//! [`Receiver::recv`] returns `None` forever.
//!
//! The backlog and the live-sender count share one lock, because closure
//! is defined by their joint state (empty AND no senders).

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

/// Create a new queue, returning its first producer and the only consumer.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            queue: VecDeque::new(),
            senders: 1,
        }),
        available: Notify::new(),
    });

    let sender = Sender {
        shared: Arc::clone(&shared),
    };
    let receiver = Receiver { shared };
    (sender, receiver)
}

struct State<T> {
    queue: VecDeque<T>,
    senders: usize,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    /// Wakes the consumer. Stores a permit when nobody is waiting, so a
    /// notification issued between the emptiness check and the wait is kept.
    available: Notify,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // The state is consistent between operations, so a panic elsewhere
        // while holding the lock leaves nothing half-applied.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Producer handle
///
/// Cloning registers one more live producer; dropping unregisters it.
pub struct Sender<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Sender<T> {
    /// Append an item to the tail of the queue and wake the consumer.
    ///
    /// Never blocks and never fails. Items sent after the receiver has
    /// been dropped are queued and discarded with the queue.
    pub fn send(&self, item: T) {
        {
            let mut state = self.shared.lock();
            state.queue.push_back(item);
        }
        self.shared.available.notify_one();
    }

    /// Number of live producer handles, this one included
    pub fn sender_count(&self) -> usize {
        self.shared.lock().senders
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.shared.lock().senders += 1;
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        let closed = {
            let mut state = self.shared.lock();
            state.senders -= 1;
            state.senders == 0
        };

        if closed {
            self.shared.available.notify_one();
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("sender_count", &self.sender_count())
            .finish()
    }
}

/// Consumer handle
///
/// There is exactly one per queue and it cannot be cloned.
pub struct Receiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Receiver<T> {
    /// Receive the next item, waiting while the queue is empty and open.
    ///
    /// Returns `None` once every sender has been dropped and the backlog
    /// is empty. After that it never waits again.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            {
                let mut state = self.shared.lock();
                if let Some(item) = state.queue.pop_front() {
                    return Some(item);
                }
                if state.senders == 0 {
                    return None;
                }
            }
            self.shared.available.notified().await;
        }
    }

    /// Pop the head of the queue without waiting.
    ///
    /// Only distinguishes "item" from "nothing queued right now". It does
    /// not look at the sender count, so a closed queue also yields `None`;
    /// use [`recv`](Self::recv) to detect closure.
    pub fn try_recv(&mut self) -> Option<T> {
        self.shared.lock().queue.pop_front()
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live producer handles
    pub fn sender_count(&self) -> usize {
        self.shared.lock().senders
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Receiver")
            .field("queued", &state.queue.len())
            .field("sender_count", &state.senders)
            .finish()
    }
}
