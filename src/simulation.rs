//! Pipeline wiring and orchestration.

use std::sync::Arc;

use tracing::info;

use crate::{
    arrivals::ArrivalGenerator,
    barrier::completion_barrier,
    config::SimulationConfig,
    pool::ServerPool,
    queue::stage_queue,
    stats::{StatsAggregator, StatsSnapshot},
};

/// A fully wired simulation run.
///
/// A car's life: Arrived → WaitingAtStation → InService(Station) →
/// WaitingAtRegister → InService(Register) → Done. Transitions are
/// one-directional and driven solely by the worker owning the car at each
/// stage.
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    /// The configuration has already been validated, so wiring cannot fail.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Drive the full population through both stages and return the final
    /// statistics snapshot.
    pub async fn run(self) -> StatsSnapshot {
        let cars = self.config.cars.count;
        info!(cars, "starting simulation");

        let stats = Arc::new(StatsAggregator::new(
            self.config.stations.iter().map(|s| s.kind),
        ));

        // Queue capacity matches the population, so neither stage can ever
        // block on a full queue.
        let (station_tx, station_queue) = stage_queue(cars);
        let (register_tx, register_queue) = stage_queue(cars);
        let (barrier, completion) = completion_barrier(cars);

        let stations = ServerPool::spawn_stations(
            &self.config.stations,
            station_queue,
            register_tx,
            Arc::clone(&stats),
            self.config.seed,
        );
        let registers = ServerPool::spawn_registers(
            self.config.registers,
            register_queue,
            completion.clone(),
            Arc::clone(&stats),
            self.config.seed,
        );

        // The generator consumes the only station sender; once the last
        // station worker drains the queue, the register queue closes behind
        // it and both pools wind down on their own.
        ArrivalGenerator::new(self.config.cars, self.config.seed)
            .run(station_tx)
            .await;

        barrier.wait().await;
        drop(completion);

        stations.join().await;
        registers.join().await;

        info!(cars, "simulation complete");
        stats.snapshot()
    }
}
