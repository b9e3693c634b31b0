//! Two-stage fuel station queueing simulator.
//!
//! A finite population of cars arrives at randomized intervals, queues for a
//! fuel station (gas, diesel, LPG or electric), then queues for a cash
//! register. Each stage is a fixed-size pool of concurrent workers fed by a
//! bounded queue; a worker claims one car at a time, suspends for a
//! uniformly random service duration and records the car's observed queue
//! wait. Once every car has cleared the register stage, a single immutable
//! snapshot of the per-station and register wait statistics is produced.
//!
//! See the README for the configuration format.

#![deny(missing_docs)]

mod arrivals;
mod barrier;
mod car;
pub mod config;
pub mod error;
mod pool;
mod queue;
mod report;
mod simulation;
pub mod stats;

pub use config::{SimulationConfig, StationKind};
pub use error::ConfigError;
pub use report::Report;
pub use simulation::Simulation;
pub use stats::StatsSnapshot;
