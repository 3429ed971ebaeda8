//! Bounded work queue between the row reader and the indexing workers.
//!
//! The queue has exactly one producer and any number of consumers. Each item
//! is received by exactly one consumer. Closing consumes the producer, so
//! nothing can be pushed after close.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Create a bounded queue holding at most `capacity` items.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn work_queue<T>(capacity: usize) -> (QueueProducer<T>, QueueConsumer<T>) {
    let (tx, rx) = mpsc::channel(capacity);

    (
        QueueProducer { tx },
        QueueConsumer {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// The single sending side of the work queue.
#[derive(Debug)]
pub struct QueueProducer<T> {
    tx: mpsc::Sender<T>,
}

impl<T> QueueProducer<T> {
    /// Push an item, waiting while the queue is full.
    ///
    /// Fails, returning the item, only when every consumer has been dropped.
    pub async fn push(&self, item: T) -> Result<(), mpsc::error::SendError<T>> {
        self.tx.send(item).await
    }

    /// Signal that no more items will be pushed.
    ///
    /// Consumers receive the items still buffered, then end-of-stream.
    pub fn close(self) {
        drop(self.tx);
    }

    /// Number of items currently buffered.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of buffered items.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// A receiving side of the work queue. Clone it to add consumers.
#[derive(Debug)]
pub struct QueueConsumer<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for QueueConsumer<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T> QueueConsumer<T> {
    /// Take the next item, waiting while the queue is empty.
    ///
    /// Returns `None` once the producer has closed and the buffer is drained.
    /// Cancel safe: dropping the future never loses an item.
    pub async fn pop(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}
