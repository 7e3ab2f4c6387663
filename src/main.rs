use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use citysim::{
    driver::{ChoicePolicy, Driver},
    scenario::ScenarioLoader,
    snapshot::{self, SnapshotWriter},
    world::World,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless city simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/frontier.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the game speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Override the world seed
    #[arg(long)]
    seed: Option<i64>,

    /// Override how unattended events are answered
    #[arg(long, value_enum)]
    choice_policy: Option<ChoicePolicy>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Continue from a saved world instead of building the scenario's map
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write the final world state here
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    citysim::logging::init(&cli.log_level)?;

    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(speed) = cli.speed {
        scenario.speed = speed;
    }
    if let Some(policy) = cli.choice_policy {
        scenario.choice_policy = policy;
    }
    let ticks = cli.ticks.unwrap_or(scenario.ticks);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    let (world, start_tick) = match &cli.resume {
        Some(path) => {
            let save = snapshot::load_state(path)
                .with_context(|| format!("Failed to resume from {}", path.display()))?;
            info!(path = %path.display(), tick = save.tick, "resuming saved world");
            let world = World::from_state(save.state, scenario.catalog(), scenario.placement);
            (world, save.tick)
        }
        None => (scenario.build_world()?, 0),
    };

    let mut driver = Driver::new(world, scenario.driver_settings(), scenario.name.clone())
        .starting_at(start_tick)
        .with_snapshots(SnapshotWriter::new(&snapshot_dir, snapshot_interval));
    let summary = driver.run(ticks)?;

    if let Some(path) = &cli.save {
        snapshot::save_state(path, driver.tick(), driver.world().state())
            .with_context(|| format!("Failed to save world to {}", path.display()))?;
    }

    println!(
        "Scenario '{}' completed for {} ticks. Population: {}, money: {:.0}, stability: {:.1}, world tension: {:.1}, events: {}",
        scenario.name,
        summary.ticks,
        summary.vitals.population,
        summary.vitals.money,
        summary.vitals.stability,
        summary.vitals.world_tension,
        summary.events_spawned
    );
    Ok(())
}
