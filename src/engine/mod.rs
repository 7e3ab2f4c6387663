use serde::Serialize;
use tracing::debug;

use crate::{
    city::{border_security, TileCounts},
    systems::{PopulationSystem, RevenueSystem, StabilitySystem, TensionSystem},
    world::WorldState,
};

pub struct EngineBuilder {
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            systems: self.systems,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the tick systems in registration order.
///
/// Later systems read what earlier ones wrote (tension reads the stability
/// produced in the same tick), so order is part of the simulation rules.
pub struct Engine {
    systems: Vec<Box<dyn System>>,
}

impl Engine {
    pub fn standard() -> Self {
        EngineBuilder::new()
            .with_system(PopulationSystem::new())
            .with_system(RevenueSystem::new())
            .with_system(StabilitySystem::new())
            .with_system(TensionSystem::new())
            .build()
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    pub fn step(&mut self, state: &mut WorldState, dt: f64) -> TickReport {
        let counts = state.city.tile_counts();
        let border_perimeter = state.city.calculate_border_perimeter();
        let before = Vitals::capture(state);

        // An empty town with no homes is left untouched, income included.
        if counts.residential == 0 && state.city.population == 0 {
            debug!(dt, "tick skipped: no residential zones and no population");
            return TickReport {
                skipped: true,
                counts,
                border_perimeter,
                border_security: border_security(counts.military, border_perimeter),
                before,
                after: before,
            };
        }

        let ctx = TickContext {
            dt,
            counts,
            border_perimeter,
        };
        for system in &mut self.systems {
            system.run(&ctx, state);
        }

        let report = TickReport {
            skipped: false,
            counts,
            border_perimeter,
            border_security: ctx.border_security(),
            before,
            after: Vitals::capture(state),
        };
        debug!(
            dt,
            population = report.after.population,
            money = report.after.money,
            stability = report.after.stability,
            world_tension = report.after.world_tension,
            "tick applied"
        );
        report
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-tick inputs computed once before any system runs.
pub struct TickContext {
    pub dt: f64,
    pub counts: TileCounts,
    pub border_perimeter: usize,
}

impl TickContext {
    pub fn border_security(&self) -> f64 {
        border_security(self.counts.military, self.border_perimeter)
    }
}

pub trait System {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &TickContext, state: &mut WorldState);
}

/// The headline figures a UI redraws after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vitals {
    pub money: f64,
    pub population: u64,
    pub stability: f64,
    pub world_tension: f64,
}

impl Vitals {
    pub fn capture(state: &WorldState) -> Self {
        Self {
            money: state.city.money,
            population: state.city.population,
            stability: state.city.stability(),
            world_tension: state.global.world_tension(),
        }
    }
}

/// What a tick did, so drivers can react without diffing the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub skipped: bool,
    pub counts: TileCounts,
    pub border_perimeter: usize,
    pub border_security: f64,
    pub before: Vitals,
    pub after: Vitals,
}

impl TickReport {
    pub fn money_delta(&self) -> f64 {
        self.after.money - self.before.money
    }

    pub fn population_delta(&self) -> i64 {
        self.after.population as i64 - self.before.population as i64
    }

    pub fn stability_delta(&self) -> f64 {
        self.after.stability - self.before.stability
    }

    pub fn tension_delta(&self) -> f64 {
        self.after.world_tension - self.before.world_tension
    }

    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}
