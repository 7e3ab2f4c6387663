use crate::{
    engine::{System, TickContext},
    world::WorldState,
};

const COMMERCIAL_INCOME: f64 = 5.0;
const INDUSTRIAL_INCOME: f64 = 8.0;

/// Business income. The tick only ever adds money.
pub struct RevenueSystem;

impl RevenueSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RevenueSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RevenueSystem {
    fn name(&self) -> &str {
        "revenue"
    }

    fn run(&mut self, ctx: &TickContext, state: &mut WorldState) {
        let income = ctx.counts.commercial as f64 * COMMERCIAL_INCOME
            + ctx.counts.industrial as f64 * INDUSTRIAL_INCOME;
        state.city.money += income * ctx.dt;
    }
}
