use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    catalog::EventCatalog,
    city::{TileCoordinate, TileType, DEFAULT_MONEY, DEFAULT_STABILITY},
    driver::{ChoicePolicy, DriverSettings, DEFAULT_EVENT_INTERVAL_SECONDS},
    politics::{default_neighbors, Country, GlobalState, DEFAULT_WORLD_TENSION},
    world::{
        PlacementRules, World, WorldSettings, DEFAULT_GRID_SIZE, DEFAULT_TERRITORY_RADIUS,
    },
};

fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}

fn default_true() -> bool {
    true
}

fn default_ticks() -> u64 {
    600
}

fn default_tick_seconds() -> f64 {
    1.0
}

fn default_speed() -> f64 {
    1.0
}

fn default_event_interval() -> f64 {
    DEFAULT_EVENT_INTERVAL_SECONDS
}

fn default_city_name() -> String {
    "New City".to_string()
}

fn default_money() -> f64 {
    DEFAULT_MONEY
}

fn default_stability() -> f64 {
    DEFAULT_STABILITY
}

fn default_world_tension() -> f64 {
    DEFAULT_WORLD_TENSION
}

fn default_territory_radius() -> u32 {
    DEFAULT_TERRITORY_RADIUS
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: i64,
    #[serde(default = "default_grid_size")]
    pub width: usize,
    #[serde(default = "default_grid_size")]
    pub height: usize,
    #[serde(default = "default_true")]
    pub generate_terrain: bool,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_event_interval")]
    pub event_interval_seconds: f64,
    #[serde(default)]
    pub snapshot_interval_ticks: u64,
    /// Catalog file relative to the scenario file; the built-in catalog is
    /// used when absent.
    #[serde(default)]
    pub events: Option<PathBuf>,
    #[serde(default)]
    pub choice_policy: ChoicePolicy,
    #[serde(default)]
    pub city: CitySetup,
    #[serde(default)]
    pub politics: PoliticsSetup,
    #[serde(default)]
    pub territory: TerritorySetup,
    #[serde(default)]
    pub placement: PlacementRules,
    #[serde(default)]
    pub placements: Vec<Placement>,
    #[serde(skip)]
    source_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CitySetup {
    #[serde(default = "default_city_name")]
    pub name: String,
    #[serde(default = "default_money")]
    pub money: f64,
    #[serde(default)]
    pub population: u64,
    #[serde(default = "default_stability")]
    pub stability: f64,
}

impl Default for CitySetup {
    fn default() -> Self {
        Self {
            name: default_city_name(),
            money: default_money(),
            population: 0,
            stability: default_stability(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoliticsSetup {
    #[serde(default = "default_world_tension")]
    pub world_tension: f64,
    #[serde(default = "default_neighbors")]
    pub neighbors: Vec<Country>,
}

impl Default for PoliticsSetup {
    fn default() -> Self {
        Self {
            world_tension: default_world_tension(),
            neighbors: default_neighbors(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerritorySetup {
    #[serde(default)]
    pub center: Option<TileCoordinate>,
    #[serde(default = "default_territory_radius")]
    pub radius: u32,
}

impl Default for TerritorySetup {
    fn default() -> Self {
        Self {
            center: None,
            radius: default_territory_radius(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub tile_type: TileType,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let mut scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario.source_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_dir.clone());
        Ok(scenario)
    }
}

impl Scenario {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse scenario")
    }

    pub fn settings(&self) -> WorldSettings {
        WorldSettings {
            city_name: self.city.name.clone(),
            width: self.width,
            height: self.height,
            seed: Some(self.seed),
            generate_terrain: self.generate_terrain,
            global: GlobalState::new(self.politics.world_tension, self.politics.neighbors.clone()),
            territory_center: self.territory.center,
            territory_radius: self.territory.radius,
            placement: self.placement,
        }
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            tick_seconds: self.tick_seconds,
            speed: self.speed,
            event_interval_seconds: self.event_interval_seconds,
            choice_policy: self.choice_policy,
        }
    }

    /// The configured catalog, or the built-in one. A catalog that fails to
    /// load leaves the world without events rather than failing the run.
    pub fn catalog(&self) -> EventCatalog {
        match &self.events {
            Some(path) => EventCatalog::load_or_empty(self.source_dir.join(path)),
            None => EventCatalog::builtin(),
        }
    }

    pub fn build_world(&self) -> Result<World> {
        let mut world = World::with_settings(self.settings(), self.catalog());
        {
            let city = world.city_mut();
            city.money = self.city.money;
            city.population = self.city.population;
            city.set_stability(self.city.stability);
        }
        for placement in &self.placements {
            world
                .place_tile(placement.x, placement.y, placement.tile_type)
                .with_context(|| {
                    format!(
                        "Scenario '{}' cannot place {} at ({}, {})",
                        self.name, placement.tile_type, placement.x, placement.y
                    )
                })?;
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scenario_uses_defaults() {
        let scenario = Scenario::from_yaml_str("name: bare\nseed: 4\n").unwrap();
        assert_eq!(scenario.width, 200);
        assert_eq!(scenario.ticks, 600);
        assert_eq!(scenario.choice_policy, ChoicePolicy::First);
        assert_eq!(scenario.politics.neighbors.len(), 4);
        assert_eq!(scenario.placement, PlacementRules::default());
    }

    #[test]
    fn out_of_range_relationships_are_clamped_on_build() {
        let text = "name: wild\nseed: 2\nwidth: 10\nheight: 10\ngenerate_terrain: false\npolitics:\n  neighbors:\n    - { id: 1, name: Hothead, relationship: -400.0, military_strength: 50 }\n    - { id: 2, name: Sweetheart, relationship: 180.0, military_strength: 5 }\n";
        let scenario = Scenario::from_yaml_str(text).unwrap();
        let world = scenario.build_world().unwrap();
        let relationships: Vec<f64> = world
            .global()
            .neighbors
            .iter()
            .map(|c| c.relationship)
            .collect();
        assert_eq!(relationships, vec![-100.0, 100.0]);
        assert!(world.state().validate().is_ok());
    }

    #[test]
    fn bad_placement_fails_the_build() {
        let text = "name: bad\nseed: 1\nwidth: 10\nheight: 10\ngenerate_terrain: false\nterritory:\n  radius: 1\nplacements:\n  - { x: 0, y: 0, type: residential }\n";
        let scenario = Scenario::from_yaml_str(text).unwrap();
        let err = scenario.build_world().err().unwrap();
        assert!(format!("{err:#}").contains("outside the city's territory"));
    }
}
