mod population;
mod revenue;
mod stability;
mod tension;

pub use population::PopulationSystem;
pub use revenue::RevenueSystem;
pub use stability::StabilitySystem;
pub use tension::TensionSystem;
