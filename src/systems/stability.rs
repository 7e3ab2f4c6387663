use crate::{
    engine::{System, TickContext},
    world::WorldState,
};

const PARK_BONUS: f64 = 0.5;
const INDUSTRY_PENALTY: f64 = 0.3;
const POVERTY_PENALTY: f64 = 2.0;
const POVERTY_LINE: f64 = 100.0;

pub struct StabilitySystem;

impl StabilitySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StabilitySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for StabilitySystem {
    fn name(&self) -> &str {
        "stability"
    }

    fn run(&mut self, ctx: &TickContext, state: &mut WorldState) {
        let dt = ctx.dt;
        let mut delta = ctx.counts.parks as f64 * PARK_BONUS * dt
            - ctx.counts.industrial as f64 * INDUSTRY_PENALTY * dt;
        if state.city.money < POVERTY_LINE {
            delta -= POVERTY_PENALTY * dt;
        }
        state.city.adjust_stability(delta);
    }
}
