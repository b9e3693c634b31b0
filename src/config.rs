//! Configuration loading and validation.
//!
//! The JSON file mirrors the shape the simulation consumes: an arrival
//! section, one section per station kind and a register section, with all
//! durations in milliseconds. Validation happens once, up front, and names
//! the offending field; the resulting [`SimulationConfig`] is immutable for
//! the rest of the run.

use std::{collections::HashMap, fmt, fs::File, path::Path, time::Duration};

use rand::Rng;
use serde::Deserialize;

use crate::error::ConfigError;

/// The closed set of station kinds a forecourt can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationKind {
    /// Petrol pumps.
    Gas,
    /// Diesel pumps.
    Diesel,
    /// LPG pumps.
    Lpg,
    /// Electric chargers.
    Electric,
}

impl fmt::Display for StationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StationKind::Gas => "gas",
            StationKind::Diesel => "diesel",
            StationKind::Lpg => "lpg",
            StationKind::Electric => "electric",
        })
    }
}

/// An inclusive `[min, max]` duration range, drawn from uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// Build a range, rejecting `max < min`. `field` names the
    /// configuration entry for error reporting.
    pub fn new(
        field: impl Into<String>,
        min: Duration,
        max: Duration,
    ) -> Result<Self, ConfigError> {
        if max < min {
            return Err(ConfigError::InvertedRange {
                field: field.into(),
                min,
                max,
            });
        }
        Ok(Self { min, max })
    }

    /// Draw a duration in `[min, max]`, both bounds inclusive. A degenerate
    /// range (`min == max`) always yields exactly that value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }

    /// The lower bound.
    pub fn min(&self) -> Duration {
        self.min
    }

    /// The upper bound.
    pub fn max(&self) -> Duration {
        self.max
    }
}

/// The arrival side of the configuration: how many cars, and how far apart.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalPlan {
    /// Total number of cars to generate.
    pub count: usize,
    /// Inter-arrival delay range.
    pub delay: DelayRange,
}

/// One station kind's fixed pool configuration.
#[derive(Debug, Clone, Copy)]
pub struct Station {
    /// Which fuel this station dispenses.
    pub kind: StationKind,
    /// Number of concurrent servers of this kind. Zero disables the kind.
    pub servers: usize,
    /// Service duration range.
    pub serve_time: DelayRange,
}

/// The cash register stage's fixed pool configuration.
#[derive(Debug, Clone, Copy)]
pub struct Registers {
    /// Number of concurrent registers.
    pub servers: usize,
    /// Handling duration range.
    pub handle_time: DelayRange,
}

/// A fully validated simulation configuration.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Arrival pacing for the car population.
    pub cars: ArrivalPlan,
    /// Configured station kinds, in kind order. Kinds absent from the file
    /// are omitted here and never appear in the report.
    pub stations: Vec<Station>,
    /// The register stage.
    pub registers: Registers,
    /// Optional seed for reproducible delay draws. Unseeded runs draw from
    /// OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    cars: RawCars,
    #[serde(default)]
    stations: HashMap<StationKind, RawStation>,
    registers: RawRegisters,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCars {
    count: usize,
    arrival_time_min_ms: u64,
    arrival_time_max_ms: u64,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    count: usize,
    serve_time_min_ms: u64,
    serve_time_max_ms: u64,
}

#[derive(Debug, Deserialize)]
struct RawRegisters {
    count: usize,
    handle_time_min_ms: u64,
    handle_time_max_ms: u64,
}

impl SimulationConfig {
    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let raw: RawConfig = serde_json::from_reader(file)?;
        Self::from_raw(raw)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.cars.count == 0 {
            return Err(ConfigError::ZeroCount {
                field: "cars.count".into(),
            });
        }
        let cars = ArrivalPlan {
            count: raw.cars.count,
            delay: DelayRange::new(
                "cars.arrival_time",
                Duration::from_millis(raw.cars.arrival_time_min_ms),
                Duration::from_millis(raw.cars.arrival_time_max_ms),
            )?,
        };

        // Sort by kind so runs and reports are independent of map order.
        let mut entries: Vec<_> = raw.stations.into_iter().collect();
        entries.sort_by_key(|(kind, _)| *kind);

        let mut stations = Vec::with_capacity(entries.len());
        for (kind, station) in entries {
            stations.push(Station {
                kind,
                servers: station.count,
                serve_time: DelayRange::new(
                    format!("stations.{kind}.serve_time"),
                    Duration::from_millis(station.serve_time_min_ms),
                    Duration::from_millis(station.serve_time_max_ms),
                )?,
            });
        }

        if stations.iter().all(|s| s.servers == 0) {
            return Err(ConfigError::NoStationServers);
        }

        if raw.registers.count == 0 {
            return Err(ConfigError::ZeroCount {
                field: "registers.count".into(),
            });
        }
        let registers = Registers {
            servers: raw.registers.count,
            handle_time: DelayRange::new(
                "registers.handle_time",
                Duration::from_millis(raw.registers.handle_time_min_ms),
                Duration::from_millis(raw.registers.handle_time_max_ms),
            )?,
        };

        Ok(Self {
            cars,
            stations,
            registers,
            seed: raw.seed,
        })
    }
}
