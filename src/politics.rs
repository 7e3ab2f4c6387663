use serde::{Deserialize, Serialize};

pub const DEFAULT_WORLD_TENSION: f64 = 25.0;

/// Relationship below which a neighbour counts as hostile.
pub const HOSTILITY_THRESHOLD: f64 = -20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: u32,
    pub name: String,
    pub relationship: f64,
    pub military_strength: u32,
}

impl Country {
    pub fn new(id: u32, name: impl Into<String>, relationship: f64, military_strength: u32) -> Self {
        Self {
            id,
            name: name.into(),
            relationship: relationship.clamp(-100.0, 100.0),
            military_strength,
        }
    }

    /// Pulls a relationship read from config back into `-100..=100`.
    pub fn clamped(mut self) -> Self {
        self.relationship = self.relationship.clamp(-100.0, 100.0);
        self
    }

    pub fn is_hostile(&self) -> bool {
        self.relationship < HOSTILITY_THRESHOLD
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    world_tension: f64,
    pub neighbors: Vec<Country>,
}

impl GlobalState {
    pub fn new(world_tension: f64, neighbors: Vec<Country>) -> Self {
        Self {
            world_tension: world_tension.clamp(0.0, 100.0),
            neighbors: neighbors.into_iter().map(Country::clamped).collect(),
        }
    }

    pub fn world_tension(&self) -> f64 {
        self.world_tension
    }

    pub fn set_world_tension(&mut self, value: f64) {
        self.world_tension = value.clamp(0.0, 100.0);
    }

    pub fn adjust_world_tension(&mut self, delta: f64) {
        self.set_world_tension(self.world_tension + delta);
    }

    /// Mean relationship across neighbours; 0 with no neighbours.
    pub fn average_relationship(&self) -> f64 {
        if self.neighbors.is_empty() {
            return 0.0;
        }
        let total: f64 = self.neighbors.iter().map(|c| c.relationship).sum();
        total / self.neighbors.len() as f64
    }

    pub fn hostile_neighbors(&self) -> impl Iterator<Item = &Country> {
        self.neighbors.iter().filter(|c| c.is_hostile())
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.world_tension) {
            return Err(format!("world tension {} outside 0..=100", self.world_tension));
        }
        if let Some(country) = self
            .neighbors
            .iter()
            .find(|c| !(-100.0..=100.0).contains(&c.relationship))
        {
            return Err(format!(
                "relationship {} with {} outside -100..=100",
                country.relationship, country.name
            ));
        }
        Ok(())
    }
}

impl Default for GlobalState {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_TENSION, default_neighbors())
    }
}

pub fn default_neighbors() -> Vec<Country> {
    vec![
        Country::new(1, "Northreach", 15.0, 40),
        Country::new(2, "Valtaria", -35.0, 75),
        Country::new(3, "Coastal League", 40.0, 25),
        Country::new(4, "Drumholt", -10.0, 55),
    ]
}
