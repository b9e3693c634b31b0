//! Wait-time statistics aggregation.
//!
//! The aggregator is the only cross-worker mutable state besides the stage
//! queues: every update goes through one mutex, and the snapshot is taken
//! only after the completion barrier confirms no writers remain.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use crate::config::StationKind;

/// One named accumulator: cars served, cumulative wait and maximum wait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    /// Cars that completed this bucket's stage.
    pub served: u64,
    /// Sum of all recorded queue waits.
    pub total_wait: Duration,
    /// Largest single recorded queue wait.
    pub max_wait: Duration,
}

impl Bucket {
    fn record(&mut self, wait: Duration) {
        self.served += 1;
        self.total_wait += wait;
        self.max_wait = self.max_wait.max(wait);
    }

    /// Mean wait, or `None` for a bucket no car ever reached.
    pub fn average_wait(&self) -> Option<Duration> {
        if self.served == 0 {
            None
        } else {
            Some(self.total_wait / self.served as u32)
        }
    }
}

#[derive(Debug, Clone)]
struct Buckets {
    stations: BTreeMap<StationKind, Bucket>,
    registers: Bucket,
}

/// Shared aggregator updated by pool workers as cars complete each stage.
///
/// Exactly one record call is made per car per stage.
#[derive(Debug)]
pub struct StatsAggregator {
    inner: Mutex<Buckets>,
}

impl StatsAggregator {
    /// Start with a zeroed bucket for each configured station kind, so a
    /// kind that ends up serving no cars still appears in the report as
    /// "no data" rather than vanishing.
    pub fn new(kinds: impl IntoIterator<Item = StationKind>) -> Self {
        Self {
            inner: Mutex::new(Buckets {
                stations: kinds.into_iter().map(|k| (k, Bucket::default())).collect(),
                registers: Bucket::default(),
            }),
        }
    }

    /// Record one car's queue wait at a station of the given kind.
    pub fn record_station(&self, kind: StationKind, wait: Duration) {
        self.lock().stations.entry(kind).or_default().record(wait);
    }

    /// Record one car's queue wait at the register stage.
    pub fn record_register(&self, wait: Duration) {
        self.lock().registers.record(wait);
    }

    /// An immutable copy of every bucket.
    ///
    /// Only meaningful once the completion barrier has released, at which
    /// point no further writes can race with the read and repeated snapshots
    /// are identical.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.lock();
        StatsSnapshot {
            stations: inner.stations.clone(),
            registers: inner.registers,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buckets> {
        self.inner
            .lock()
            .expect("stats lock poisoned: a worker panicked mid-update")
    }
}

/// Immutable copy of all buckets at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Per-kind station buckets, in kind order.
    pub stations: BTreeMap<StationKind, Bucket>,
    /// The single register-stage bucket covering all cars.
    pub registers: Bucket,
}

impl StatsSnapshot {
    /// Total cars counted across every station bucket.
    pub fn station_served_total(&self) -> u64 {
        self.stations.values().map(|b| b.served).sum()
    }
}
