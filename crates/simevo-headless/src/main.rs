//! Headless host loop: builds a world, advances it tick by tick and reports
//! the final population.

mod logging;

use anyhow::{Context, Result};
use simevo_core::RunConfig;
use simevo_world::World;
use std::time::Instant;
use tracing::{info, warn};

fn main() -> Result<()> {
    let path = std::env::args().nth(1);
    let config = load_config(path.as_deref())?;

    logging::init_logging(config.json_logs)?;

    info!(
        ticks = config.ticks,
        seed = config.simulation.seed,
        width = config.simulation.world.width,
        height = config.simulation.world.height,
        "Starting headless simulation"
    );

    let mut world =
        World::with_config(config.simulation.clone()).context("failed to build the world")?;

    let started = Instant::now();
    for _ in 0..config.ticks {
        world.update();

        if world.is_extinct() {
            warn!(tick = world.tick(), "All animals died, stopping early");
            break;
        }
    }

    let stats = world.stats();
    info!(
        ticks = stats.tick,
        elapsed_ms = started.elapsed().as_millis() as u64,
        trees = stats.trees,
        animals = stats.animals,
        "Simulation finished"
    );

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Read the run configuration from a JSON file (or defaults), then apply
/// `SIMEVO_TICKS` / `SIMEVO_SEED` overrides
fn load_config(path: Option<&str>) -> Result<RunConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path))?;
            serde_json::from_str::<RunConfig>(&raw)
                .with_context(|| format!("failed to parse config file {}", path))?
        }
        None => RunConfig::default(),
    };

    if let Ok(ticks) = std::env::var("SIMEVO_TICKS") {
        config.ticks = ticks
            .parse()
            .with_context(|| format!("SIMEVO_TICKS is not a tick count: {}", ticks))?;
    }
    if let Ok(seed) = std::env::var("SIMEVO_SEED") {
        config.simulation.seed = seed
            .parse()
            .with_context(|| format!("SIMEVO_SEED is not a number: {}", seed))?;
    }

    Ok(config)
}
