use std::process::ExitCode;

use forecourt::{Report, Simulation, SimulationConfig};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());

    let config = match SimulationConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration ({path}): {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("Simulation with {} cars in progress...", config.cars.count);
    let snapshot = Simulation::new(config).run().await;

    println!("\nStats of the simulation:\n");
    print!("{}", Report::new(&snapshot));

    ExitCode::SUCCESS
}
