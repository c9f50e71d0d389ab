use std::future::Future;
use tokio::task::JoinHandle;

use crate::domain::node::connection_queue::ConnectionQueue;

/// A fixed number of long-lived workers draining a [`ConnectionQueue`].
///
/// Each worker takes one item, runs `handler` on it to completion, then takes the next. The
/// pool never grows, so at most `size` items are in flight and the queue absorbs the rest.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn<T, F, Fut>(size: usize, queue: ConnectionQueue<T>, handler: F) -> Self
    where
        T: Send + 'static,
        F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handles = (0..size)
            .map(|worker| {
                let queue = queue.clone();
                let handler = handler.clone();
                tokio::spawn(async move {
                    log::debug!("Worker {} started.", worker);
                    while let Some(item) = queue.dequeue().await {
                        handler(item).await;
                    }
                    log::debug!("Worker {} stopped: queue closed.", worker);
                })
            })
            .collect();

        WorkerPool { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn abort(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.abort();
    }
}
