//! Headless stand-in for the game's UI loop: tick cadence, speed, event
//! cadence and unattended event resolution.

use std::path::PathBuf;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    engine::{TickReport, Vitals},
    error::SnapshotError,
    rng::{seed_at_tick, RngManager},
    snapshot::SnapshotWriter,
    world::World,
};

pub const DEFAULT_EVENT_INTERVAL_SECONDS: f64 = 10.0;

const CHOICE_STREAM: &str = "choices";

/// How an unattended run answers events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChoicePolicy {
    /// Always take the first choice.
    #[default]
    First,
    /// Take a uniformly random choice.
    Random,
    /// Leave events unanswered; no further events spawn while one is active.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverSettings {
    /// Real seconds per tick.
    pub tick_seconds: f64,
    /// Game speed multiplier applied to real time before simulating.
    pub speed: f64,
    pub event_interval_seconds: f64,
    pub choice_policy: ChoicePolicy,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            tick_seconds: 1.0,
            speed: 1.0,
            event_interval_seconds: DEFAULT_EVENT_INTERVAL_SECONDS,
            choice_policy: ChoicePolicy::First,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub report: TickReport,
    pub spawned: Option<String>,
    pub resolved: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks: u64,
    pub events_spawned: u64,
    pub events_resolved: u64,
    pub snapshots: Vec<PathBuf>,
    pub vitals: Vitals,
}

fn choice_seed(world: &World, tick: u64) -> u64 {
    seed_at_tick((world.city().seed() as u64).rotate_left(17), tick)
}

pub struct Driver {
    world: World,
    settings: DriverSettings,
    scenario_name: String,
    tick: u64,
    since_event_roll: f64,
    rng: RngManager,
    snapshot_writer: Option<SnapshotWriter>,
}

impl Driver {
    pub fn new(world: World, settings: DriverSettings, scenario_name: impl Into<String>) -> Self {
        let rng = RngManager::new(choice_seed(&world, 0));
        Self {
            world,
            settings,
            scenario_name: scenario_name.into(),
            tick: 0,
            since_event_roll: 0.0,
            rng,
            snapshot_writer: None,
        }
    }

    pub fn with_snapshots(mut self, writer: SnapshotWriter) -> Self {
        self.snapshot_writer = Some(writer);
        self
    }

    /// Continue tick numbering from a restored save. Event and choice rolls
    /// are reseeded from the tick so they differ from the original run's.
    pub fn starting_at(mut self, tick: u64) -> Self {
        self.tick = tick;
        self.world.resume_at(tick);
        self.rng = RngManager::new(choice_seed(&self.world, tick));
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the game by `real_seconds` of wall-clock time.
    pub fn advance(&mut self, real_seconds: f64) -> StepOutcome {
        let report = self.world.simulate(real_seconds * self.settings.speed);
        self.tick += 1;

        let mut spawned = None;
        self.since_event_roll += real_seconds;
        if self.since_event_roll >= self.settings.event_interval_seconds {
            self.since_event_roll = 0.0;
            spawned = self
                .world
                .spawn_event_if_needed()
                .map(|event| event.id.clone());
        }

        let resolved = self.answer_event();
        StepOutcome {
            report,
            spawned,
            resolved,
        }
    }

    fn answer_event(&mut self) -> Option<String> {
        let event = self.world.current_event()?;
        let event_id = event.id.clone();
        let choice_count = event.choices.len();
        let index = match self.settings.choice_policy {
            ChoicePolicy::Skip => return None,
            ChoicePolicy::First => 0,
            ChoicePolicy::Random if choice_count > 1 => {
                self.rng.stream(CHOICE_STREAM).gen_range(0..choice_count)
            }
            ChoicePolicy::Random => 0,
        };
        let choice = self.world.resolve_current(index);
        debug!(
            event = %event_id,
            choice = choice.as_ref().map(|c| c.id.as_str()).unwrap_or("dismissed"),
            "event answered by driver"
        );
        Some(event_id)
    }

    pub fn run(&mut self, ticks: u64) -> Result<RunSummary, SnapshotError> {
        let mut summary = RunSummary {
            ticks: 0,
            events_spawned: 0,
            events_resolved: 0,
            snapshots: Vec::new(),
            vitals: Vitals::capture(self.world.state()),
        };
        for _ in 0..ticks {
            let outcome = self.advance(self.settings.tick_seconds);
            summary.ticks += 1;
            summary.events_spawned += outcome.spawned.is_some() as u64;
            summary.events_resolved += outcome.resolved.is_some() as u64;
            if let Some(writer) = &self.snapshot_writer {
                if let Some(path) =
                    writer.maybe_write(self.tick, &self.scenario_name, self.world.state())?
                {
                    summary.snapshots.push(path);
                }
            }
        }
        summary.vitals = Vitals::capture(self.world.state());
        info!(
            scenario = %self.scenario_name,
            ticks = summary.ticks,
            population = summary.vitals.population,
            money = summary.vitals.money,
            events = summary.events_spawned,
            "run complete"
        );
        Ok(summary)
    }
}
