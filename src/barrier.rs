//! Completion tracking for the final pipeline stage.

use std::sync::Arc;

use tokio::sync::watch;

/// Create a countdown seeded with the total car population.
///
/// The register stage counts each finished car down exactly once; the
/// barrier releases when the count reaches zero. There are no partial or
/// cancel semantics: the run always processes the full population.
pub(crate) fn completion_barrier(total: usize) -> (CompletionBarrier, CompletionHandle) {
    let (tx, rx) = watch::channel(total);
    (
        CompletionBarrier { rx },
        CompletionHandle { tx: Arc::new(tx) },
    )
}

/// Waiting side, held by the orchestrator.
#[derive(Debug)]
pub(crate) struct CompletionBarrier {
    rx: watch::Receiver<usize>,
}

/// Counting side, cloned into each register worker.
#[derive(Debug, Clone)]
pub(crate) struct CompletionHandle {
    tx: Arc<watch::Sender<usize>>,
}

impl CompletionHandle {
    /// Record one finished car.
    ///
    /// Counting below zero means a car was observed twice, which is a
    /// synchronization bug and aborts the run.
    pub fn car_done(&self) {
        self.tx.send_modify(|remaining| {
            assert!(
                *remaining > 0,
                "completion barrier underflow: a car finished twice"
            );
            *remaining -= 1;
        });
    }
}

impl CompletionBarrier {
    /// Block until every car has finished the final stage.
    pub async fn wait(mut self) {
        self.rx
            .wait_for(|remaining| *remaining == 0)
            .await
            .map(|_| ())
            .expect("all completion handles dropped with cars still outstanding");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn releases_once_every_car_is_done() {
        let (barrier, handle) = completion_barrier(3);
        for _ in 0..3 {
            handle.car_done();
        }
        barrier.wait().await;
    }

    #[tokio::test]
    async fn waits_while_cars_are_outstanding() {
        let (barrier, handle) = completion_barrier(2);
        handle.car_done();

        let waiter = tokio::spawn(barrier.wait());
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        handle.car_done();
        waiter.await.unwrap();
    }

    #[tokio::test]
    #[should_panic(expected = "a car finished twice")]
    async fn panics_if_a_car_is_counted_twice() {
        let (_barrier, handle) = completion_barrier(1);
        handle.car_done();
        handle.car_done();
    }
}
