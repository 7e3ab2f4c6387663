use crate::{
    engine::{System, TickContext},
    world::WorldState,
};

/// Residential tiles each contribute this many new residents per second
/// before multipliers.
const GROWTH_PER_RESIDENTIAL: f64 = 2.0;

pub struct PopulationSystem;

impl PopulationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PopulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PopulationSystem {
    fn name(&self) -> &str {
        "population"
    }

    fn run(&mut self, ctx: &TickContext, state: &mut WorldState) {
        let counts = &ctx.counts;
        let city = &mut state.city;
        let capacity = counts.population_capacity();
        if city.population >= capacity || counts.residential == 0 {
            return;
        }

        let mut multiplier = stability_multiplier(city.stability());
        let unemployment = counts.unemployment(city.population);
        if unemployment > 0 {
            let rate = unemployment as f64 / city.population.max(1) as f64;
            multiplier *= unemployment_penalty(rate);
        }

        let raw = counts.residential as f64 * GROWTH_PER_RESIDENTIAL * ctx.dt * multiplier;
        // At least one newcomer per tick, however small dt is.
        let growth = (raw.floor().max(0.0) as u64).max(1);
        city.population = city.population.saturating_add(growth).min(capacity);
    }
}

fn stability_multiplier(stability: f64) -> f64 {
    if stability > 70.0 {
        1.5
    } else if stability > 40.0 {
        1.0
    } else {
        0.5
    }
}

fn unemployment_penalty(rate: f64) -> f64 {
    if rate > 0.5 {
        0.1
    } else if rate > 0.2 {
        0.3
    } else {
        0.6
    }
}
