//! The unit of work flowing through the pipeline.

use std::time::Duration;

use tokio::time::Instant;

/// A car moving through the two-stage pipeline.
///
/// Owned by exactly one queue or worker at any instant and transferred by
/// value between stages. `queued_at` is re-stamped whenever the car enters a
/// stage queue; the wait and service fields are each written once, by the
/// worker that processed the corresponding stage. Dropped after the register
/// stage finishes with it.
#[derive(Debug)]
pub(crate) struct Car {
    pub id: usize,
    /// When the car entered its current stage's queue.
    pub queued_at: Instant,
    pub station_wait: Duration,
    pub station_service: Duration,
    pub register_wait: Duration,
    pub register_service: Duration,
}

impl Car {
    pub fn arrive(id: usize, now: Instant) -> Self {
        Self {
            id,
            queued_at: now,
            station_wait: Duration::ZERO,
            station_service: Duration::ZERO,
            register_wait: Duration::ZERO,
            register_service: Duration::ZERO,
        }
    }
}
