//! Arrival generation: paced submission of the car population.

use rand::{rngs::StdRng, SeedableRng};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::{car::Car, config::ArrivalPlan, queue::StageSender};

/// Submits exactly `plan.count` cars to the station queue, sleeping a fresh
/// uniform draw from the arrival range between submissions.
///
/// Pacing is sequential by design: the caller is suspended for the sum of
/// all drawn delays. Each car is stamped with its submission instant.
pub(crate) struct ArrivalGenerator {
    plan: ArrivalPlan,
    rng: StdRng,
}

impl ArrivalGenerator {
    pub fn new(plan: ArrivalPlan, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { plan, rng }
    }

    /// Generate the whole population, then drop the sender so the station
    /// queue closes behind the last car.
    pub async fn run(mut self, station_queue: StageSender<Car>) {
        for id in 0..self.plan.count {
            let car = Car::arrive(id, Instant::now());
            debug!(car = id, "car arrived");
            station_queue
                .send(car)
                .await
                .expect("station queue closed while cars were still arriving");

            let delay = self.plan.delay.sample(&mut self.rng);
            sleep(delay).await;
        }
    }
}
