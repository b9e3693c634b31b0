//! Bounded FIFO hand-off between pipeline stages.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

/// Create a stage queue with the given capacity.
///
/// Capacity is sized to the whole car population, so producers never block
/// on a full queue in practice.
pub(crate) fn stage_queue<T>(capacity: usize) -> (StageSender<T>, StageQueue<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        StageSender(tx),
        StageQueue {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer half of a stage queue. Clonable; the queue closes once every
/// sender has been dropped.
#[derive(Debug)]
pub(crate) struct StageSender<T>(mpsc::Sender<T>);

impl<T> Clone for StageSender<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> StageSender<T> {
    /// Submit an item to the back of the queue.
    pub async fn send(&self, item: T) -> Result<(), mpsc::error::SendError<T>> {
        self.0.send(item).await
    }
}

/// Claim half of a stage queue, shared by every worker of a pool.
///
/// Claiming is a blocking pop: an idle worker suspends until an item arrives
/// or the queue is permanently closed and drained. The mutex serialises
/// claims, so each item is handed to exactly one worker; items come out in
/// arrival order, claimed by whichever idle worker locks first.
#[derive(Debug)]
pub(crate) struct StageQueue<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for StageQueue<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T> StageQueue<T> {
    /// Claim the next item, or `None` once the queue is closed and drained.
    pub async fn claim(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}
