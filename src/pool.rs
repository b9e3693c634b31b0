//! Fixed-size server pools for the two pipeline stages.

use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, SeedableRng};
use tokio::{
    task::JoinHandle,
    time::{sleep, Instant},
};
use tracing::debug;

use crate::{
    barrier::CompletionHandle,
    car::Car,
    config::{DelayRange, Registers, Station, StationKind},
    queue::{StageQueue, StageSender},
    stats::StatsAggregator,
};

/// Per-worker seed derivation, so every worker draws an independent but
/// reproducible sequence under a fixed top-level seed.
const REGISTER_SEED_BASE: u64 = 1 << 32;

/// A fixed set of long-lived workers serving one pipeline stage.
///
/// Each worker repeatedly claims a car from the stage's input queue,
/// suspends for a freshly drawn service duration, records the car's queue
/// wait, and forwards or finishes it. Claim-and-process is atomic per car.
/// A pool winds down on its own once its input queue is closed and drained.
pub(crate) struct ServerPool {
    workers: Vec<JoinHandle<()>>,
}

impl ServerPool {
    /// Spawn the station stage: `servers` workers per configured kind, all
    /// claiming from the single shared station queue and forwarding served
    /// cars to the register queue.
    pub fn spawn_stations(
        stations: &[Station],
        intake: StageQueue<Car>,
        register_queue: StageSender<Car>,
        stats: Arc<StatsAggregator>,
        seed: Option<u64>,
    ) -> Self {
        let mut workers = Vec::new();
        for station in stations {
            for _ in 0..station.servers {
                let worker = StationWorker {
                    kind: station.kind,
                    serve_time: station.serve_time,
                    intake: intake.clone(),
                    register_queue: register_queue.clone(),
                    stats: Arc::clone(&stats),
                    rng: worker_rng(seed, workers.len() as u64),
                };
                workers.push(tokio::spawn(worker.run()));
            }
        }
        Self { workers }
    }

    /// Spawn the register stage: workers claim cars leaving the stations,
    /// handle them, and count each one down on the completion barrier.
    pub fn spawn_registers(
        registers: Registers,
        intake: StageQueue<Car>,
        completion: CompletionHandle,
        stats: Arc<StatsAggregator>,
        seed: Option<u64>,
    ) -> Self {
        let workers = (0..registers.servers)
            .map(|slot| {
                let worker = RegisterWorker {
                    handle_time: registers.handle_time,
                    intake: intake.clone(),
                    completion: completion.clone(),
                    stats: Arc::clone(&stats),
                    rng: worker_rng(seed, REGISTER_SEED_BASE + slot as u64),
                };
                tokio::spawn(worker.run())
            })
            .collect();
        Self { workers }
    }

    /// Wait for every worker to exit. Called after the input queue has
    /// closed; a worker that panicked propagates the panic here.
    pub async fn join(self) {
        for worker in self.workers {
            worker.await.expect("pool worker panicked");
        }
    }
}

fn worker_rng(seed: Option<u64>, salt: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(salt)),
        None => StdRng::from_os_rng(),
    }
}

/// Queue wait for the stage just completed: time since the car entered the
/// stage queue, minus the service it just received.
///
/// Underflow would mean the clock went backwards or two workers touched the
/// same car; that is a synchronization bug, so abort rather than corrupt
/// the statistics.
fn stage_wait(queued_at: Instant, service: Duration) -> Duration {
    (Instant::now() - queued_at)
        .checked_sub(service)
        .expect("negative wait computed: car timestamps corrupted")
}

struct StationWorker {
    kind: StationKind,
    serve_time: DelayRange,
    intake: StageQueue<Car>,
    register_queue: StageSender<Car>,
    stats: Arc<StatsAggregator>,
    rng: StdRng,
}

impl StationWorker {
    async fn run(mut self) {
        while let Some(mut car) = self.intake.claim().await {
            let service = self.serve_time.sample(&mut self.rng);
            sleep(service).await;

            let wait = stage_wait(car.queued_at, service);
            self.stats.record_station(self.kind, wait);

            car.station_wait = wait;
            car.station_service = service;
            car.queued_at = Instant::now();
            debug!(
                car = car.id,
                kind = %self.kind,
                wait_us = car.station_wait.as_micros() as u64,
                service_us = car.station_service.as_micros() as u64,
                "station served car"
            );

            // Register workers outlive every station worker: they only stop
            // once all clones of this sender are gone.
            self.register_queue
                .send(car)
                .await
                .expect("register queue closed while stations were still serving");
        }
    }
}

struct RegisterWorker {
    handle_time: DelayRange,
    intake: StageQueue<Car>,
    completion: CompletionHandle,
    stats: Arc<StatsAggregator>,
    rng: StdRng,
}

impl RegisterWorker {
    async fn run(mut self) {
        while let Some(mut car) = self.intake.claim().await {
            let service = self.handle_time.sample(&mut self.rng);
            sleep(service).await;

            let wait = stage_wait(car.queued_at, service);
            self.stats.record_register(wait);

            car.register_wait = wait;
            car.register_service = service;
            debug!(
                car = car.id,
                wait_us = car.register_wait.as_micros() as u64,
                service_us = car.register_service.as_micros() as u64,
                "register handled car"
            );

            // The car's journey ends here; nothing downstream reads it.
            drop(car);
            self.completion.car_done();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{barrier::completion_barrier, queue::stage_queue};

    fn constant(ms: u64) -> DelayRange {
        DelayRange::new(
            "test",
            Duration::from_millis(ms),
            Duration::from_millis(ms),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn single_station_worker_serves_in_arrival_order() {
        let stats = Arc::new(StatsAggregator::new([StationKind::Gas]));
        let (station_tx, station_queue) = stage_queue(2);
        let (register_tx, register_queue) = stage_queue(2);

        let pool = ServerPool::spawn_stations(
            &[Station {
                kind: StationKind::Gas,
                servers: 1,
                serve_time: constant(10),
            }],
            station_queue,
            register_tx,
            Arc::clone(&stats),
            Some(0),
        );

        let start = Instant::now();
        station_tx.send(Car::arrive(0, start)).await.unwrap();
        station_tx.send(Car::arrive(1, start)).await.unwrap();
        drop(station_tx);
        pool.join().await;

        let first = register_queue.claim().await.unwrap();
        let second = register_queue.claim().await.unwrap();
        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);

        // The first car is served immediately; the second waits behind it.
        assert_eq!(first.station_wait, Duration::ZERO);
        assert_eq!(second.station_wait, Duration::from_millis(10));
        assert_eq!(first.station_service, Duration::from_millis(10));

        // Forwarding re-stamps the queue-entry timestamp.
        assert_eq!(first.queued_at, start + Duration::from_millis(10));
        assert_eq!(second.queued_at, start + Duration::from_millis(20));

        let gas = stats.snapshot().stations[&StationKind::Gas];
        assert_eq!(gas.served, 2);
        assert_eq!(gas.total_wait, Duration::from_millis(10));
        assert_eq!(gas.max_wait, Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_workers_serve_concurrently() {
        let stats = Arc::new(StatsAggregator::new([StationKind::Diesel]));
        let (station_tx, station_queue) = stage_queue(2);
        let (register_tx, register_queue) = stage_queue(2);

        let pool = ServerPool::spawn_stations(
            &[Station {
                kind: StationKind::Diesel,
                servers: 2,
                serve_time: constant(10),
            }],
            station_queue,
            register_tx,
            Arc::clone(&stats),
            Some(0),
        );

        let start = Instant::now();
        station_tx.send(Car::arrive(0, start)).await.unwrap();
        station_tx.send(Car::arrive(1, start)).await.unwrap();
        drop(station_tx);
        pool.join().await;
        drop(register_queue);

        // With two servers neither car queues behind the other.
        let diesel = stats.snapshot().stations[&StationKind::Diesel];
        assert_eq!(diesel.served, 2);
        assert_eq!(diesel.total_wait, Duration::ZERO);
        assert_eq!(start.elapsed(), Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn register_workers_count_cars_down_on_the_barrier() {
        let stats = Arc::new(StatsAggregator::new([]));
        let (register_tx, register_queue) = stage_queue(2);
        let (barrier, completion) = completion_barrier(2);

        let pool = ServerPool::spawn_registers(
            Registers {
                servers: 1,
                handle_time: constant(5),
            },
            register_queue,
            completion,
            Arc::clone(&stats),
            Some(0),
        );

        let start = Instant::now();
        register_tx.send(Car::arrive(0, start)).await.unwrap();
        register_tx.send(Car::arrive(1, start)).await.unwrap();
        drop(register_tx);

        barrier.wait().await;
        pool.join().await;

        let registers = stats.snapshot().registers;
        assert_eq!(registers.served, 2);
        assert_eq!(registers.total_wait, Duration::from_millis(5));
        assert_eq!(registers.max_wait, Duration::from_millis(5));
    }
}
