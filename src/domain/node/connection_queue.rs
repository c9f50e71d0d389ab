use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Bounded FIFO handing accepted connections from the acceptor to the worker pool.
///
/// `enqueue` waits while `capacity` items are pending, `dequeue` waits while none are. Workers
/// share the single receiving end behind an async mutex, so each item goes to exactly one worker.
#[derive(Debug)]
pub struct ConnectionQueue<T> {
    sender: mpsc::Sender<T>,
    receiver: Arc<Mutex<mpsc::Receiver<T>>>,
    capacity: usize,
}

impl<T> Clone for ConnectionQueue<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone(), receiver: self.receiver.clone(), capacity: self.capacity }
    }
}

impl<T> ConnectionQueue<T> {
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self { sender: tx, receiver: Arc::new(Mutex::new(rx)), capacity }
    }

    /// Items waiting to be dequeued.
    pub fn len(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `item`, waiting for a free place while the queue is full.
    ///
    /// # Returns
    /// The item back if the receiving side is gone.
    pub async fn enqueue(&self, item: T) -> Result<(), T> {
        self.sender.send(item).await.map_err(|e| e.0)
    }

    /// Removes the oldest item, waiting while the queue is empty.
    ///
    /// `None` once every sender is dropped and the queue is drained.
    pub async fn dequeue(&self) -> Option<T> {
        self.receiver.lock().await.recv().await
    }
}
