//! Ember Hollow - headless runner
//!
//! Generates a world, runs it for a number of ticks and optionally writes a
//! JSON snapshot of the final state.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ember_hollow::core::config::SimulationConfig;
use ember_hollow::core::error::Result;
use ember_hollow::core::types::Species;
use ember_hollow::ecs::World;
use ember_hollow::simulation::{run_simulation_tick, SimulationEvent, WorldSnapshot};

/// Headless village ecology simulation
#[derive(Parser, Debug)]
#[command(name = "ember-hollow")]
#[command(about = "Run the village ecology simulation without a renderer")]
struct Args {
    /// World seed; overrides the config file. Random when absent everywhere
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON snapshot of the final world here
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ember_hollow=info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let seed = args
        .seed
        .or(config.world.seed)
        .unwrap_or_else(rand::random);
    tracing::info!(seed, ticks = args.ticks, "Ember Hollow starting");

    let mut world = World::generate(config, seed)?;

    let mut kills = 0usize;
    let mut built = 0usize;
    for _ in 0..args.ticks {
        for event in run_simulation_tick(&mut world) {
            match event {
                SimulationEvent::Killed { .. } => kills += 1,
                SimulationEvent::Job(ember_hollow::jobs::JobEvent::FacilityBuilt { .. }) => built += 1,
                _ => {}
            }
        }
    }

    tracing::info!(
        tick = world.current_tick(),
        day = world.clock.current_day(),
        deer = world.living_count(Species::Deer),
        wolves = world.living_count(Species::Wolf),
        facilities = world.facilities.count(),
        kills,
        built,
        "Run finished"
    );

    if let Some(path) = &args.snapshot {
        let json = WorldSnapshot::capture(&world).to_json()?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Snapshot written");
    }

    Ok(())
}
