use crate::{
    engine::{System, TickContext},
    world::WorldState,
};

const EXPOSURE_RATE: f64 = 0.4;
const DETERRENCE_RATE: f64 = 0.3;
const CALM_RELIEF: f64 = 0.2;
const UNREST_PRESSURE: f64 = 0.15;

/// World tension from border coverage and this tick's stability.
pub struct TensionSystem;

impl TensionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TensionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TensionSystem {
    fn name(&self) -> &str {
        "tension"
    }

    fn run(&mut self, ctx: &TickContext, state: &mut WorldState) {
        let dt = ctx.dt;
        let security = ctx.border_security();
        let mut delta = 0.0;
        if security < 100.0 {
            delta += (100.0 - security) / 100.0 * EXPOSURE_RATE * dt;
        } else if security > 100.0 {
            delta -= (security - 100.0) / 100.0 * DETERRENCE_RATE * dt;
        }

        let stability = state.city.stability();
        if stability > 70.0 {
            delta -= CALM_RELIEF * dt;
        } else if stability < 30.0 {
            delta += UNREST_PRESSURE * dt;
        }
        state.global.adjust_world_tension(delta);
    }
}
