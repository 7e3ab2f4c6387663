pub mod catalog;
pub mod city;
pub mod driver;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod politics;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod terrain;
pub mod world;

pub use city::{City, Tile, TileCoordinate, TileType};
pub use driver::{ChoicePolicy, Driver, DriverSettings};
pub use engine::{Engine, TickReport};
pub use world::{World, WorldState};
