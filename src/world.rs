use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    catalog::EventCatalog,
    city::{City, TileCoordinate, TileType},
    engine::{Engine, TickReport},
    error::PlacementError,
    events::{select_event, EventChoice, EventMetrics, GameEvent, SPAWN_PROBABILITY},
    politics::GlobalState,
    rng::{seed_at_tick, RngManager},
};

pub const DEFAULT_GRID_SIZE: usize = 200;
pub const DEFAULT_TERRITORY_RADIUS: u32 = 6;

const EVENT_STREAM: &str = "events";

/// The part of a world that survives save and reload. The active event is
/// not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub city: City,
    pub global: GlobalState,
}

impl WorldState {
    pub fn validate(&self) -> Result<(), String> {
        self.city.validate()?;
        self.global.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementRules {
    pub claim_radius: u32,
    pub military_claim_radius: u32,
}

impl PlacementRules {
    pub fn claim_radius_for(&self, tile_type: TileType) -> u32 {
        match tile_type {
            TileType::Military => self.military_claim_radius,
            _ => self.claim_radius,
        }
    }
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            claim_radius: 2,
            military_claim_radius: 4,
        }
    }
}

/// A tile mutation accepted by [`World::place_tile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileChange {
    pub coordinate: TileCoordinate,
    pub from: TileType,
    pub to: TileType,
    pub territory_claimed: usize,
}

#[derive(Debug, Clone)]
pub struct WorldSettings {
    pub city_name: String,
    pub width: usize,
    pub height: usize,
    pub seed: Option<i64>,
    pub generate_terrain: bool,
    pub global: GlobalState,
    /// Defaults to the grid centre.
    pub territory_center: Option<TileCoordinate>,
    pub territory_radius: u32,
    pub placement: PlacementRules,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            city_name: "New City".to_string(),
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            seed: None,
            generate_terrain: true,
            global: GlobalState::default(),
            territory_center: None,
            territory_radius: DEFAULT_TERRITORY_RADIUS,
            placement: PlacementRules::default(),
        }
    }
}

pub struct World {
    state: WorldState,
    current_event: Option<GameEvent>,
    catalog: EventCatalog,
    placement: PlacementRules,
    engine: Engine,
    rng: RngManager,
}

impl World {
    /// A default-sized world with the built-in catalog.
    pub fn new(seed: Option<i64>) -> Self {
        Self::with_settings(
            WorldSettings {
                seed,
                ..WorldSettings::default()
            },
            EventCatalog::builtin(),
        )
    }

    pub fn with_settings(settings: WorldSettings, catalog: EventCatalog) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut city = if settings.generate_terrain {
            City::new(settings.city_name, settings.width, settings.height, Some(seed))
        } else {
            City::blank(settings.city_name, settings.width, settings.height, seed)
        };
        let center = settings.territory_center.unwrap_or_else(|| {
            TileCoordinate::new((settings.width / 2) as i32, (settings.height / 2) as i32)
        });
        city.expand_territory(center.x, center.y, settings.territory_radius);

        let state = WorldState {
            city,
            global: settings.global,
        };
        Self::from_state(state, catalog, settings.placement)
    }

    /// Rebuilds a world around restored state. No event is active afterwards.
    pub fn from_state(state: WorldState, catalog: EventCatalog, placement: PlacementRules) -> Self {
        let rng = RngManager::new(state.city.seed() as u64);
        Self {
            state,
            current_event: None,
            catalog,
            placement,
            engine: Engine::standard(),
            rng,
        }
    }

    /// Reseeds event rolls for a game continued at `tick`, so a resumed run
    /// does not replay the rolls the original run made from tick zero.
    pub fn resume_at(&mut self, tick: u64) {
        self.rng = RngManager::new(seed_at_tick(self.state.city.seed() as u64, tick));
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn into_state(self) -> WorldState {
        self.state
    }

    pub fn city(&self) -> &City {
        &self.state.city
    }

    pub fn city_mut(&mut self) -> &mut City {
        &mut self.state.city
    }

    pub fn global(&self) -> &GlobalState {
        &self.state.global
    }

    pub fn global_mut(&mut self) -> &mut GlobalState {
        &mut self.state.global
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn placement_rules(&self) -> PlacementRules {
        self.placement
    }

    pub fn current_event(&self) -> Option<&GameEvent> {
        self.current_event.as_ref()
    }

    pub fn simulate(&mut self, dt: f64) -> TickReport {
        self.engine.step(&mut self.state, dt)
    }

    pub fn event_metrics(&self) -> EventMetrics {
        let counts = self.state.city.tile_counts();
        EventMetrics::from_city(&self.state.city, &counts)
    }

    /// Rolls for a new event when none is active. Returns the event only
    /// when one was spawned by this call.
    pub fn spawn_event_if_needed(&mut self) -> Option<&GameEvent> {
        if self.current_event.is_some() {
            return None;
        }
        let metrics = self.event_metrics();
        let mut rng = self.rng.stream(EVENT_STREAM);
        if !rng.gen_bool(SPAWN_PROBABILITY) {
            return None;
        }
        let event = select_event(self.catalog.events(), &metrics, &mut rng)?.clone();
        info!(event = %event.id, title = %event.title, "event spawned");
        self.current_event = Some(event);
        self.current_event.as_ref()
    }

    /// Applies a choice's deltas and clears the active event, returning it.
    pub fn resolve_event(&mut self, choice: &EventChoice) -> Option<GameEvent> {
        let city = &mut self.state.city;
        if let Some(change) = choice.money_change {
            city.money += change;
        }
        if let Some(change) = choice.stability_change {
            city.adjust_stability(change);
        }
        if let Some(change) = choice.world_tension_change {
            self.state.global.adjust_world_tension(change);
        }
        let resolved = self.current_event.take();
        info!(
            event = resolved.as_ref().map(|e| e.id.as_str()).unwrap_or("none"),
            choice = %choice.id,
            "event resolved"
        );
        resolved
    }

    /// Resolves the active event with its choice at `index`. An event with no
    /// choices is simply dismissed.
    pub fn resolve_current(&mut self, index: usize) -> Option<EventChoice> {
        let event = self.current_event.as_ref()?;
        if event.choices.is_empty() {
            self.current_event = None;
            return None;
        }
        let choice = event.choices.get(index)?.clone();
        self.resolve_event(&choice);
        Some(choice)
    }

    /// Player placement with terrain and territory checks. Non-empty
    /// placements claim land around the tile.
    pub fn place_tile(
        &mut self,
        x: i32,
        y: i32,
        tile_type: TileType,
    ) -> Result<TileChange, PlacementError> {
        let city = &mut self.state.city;
        let existing = city
            .tile_type(x, y)
            .ok_or(PlacementError::OutOfBounds { x, y })?;
        if tile_type.is_terrain() {
            return Err(PlacementError::TerrainNotPlaceable(tile_type));
        }
        if existing.is_terrain() {
            return Err(PlacementError::TerrainImmutable { x, y, existing });
        }
        if !city.is_within_territory(x, y) {
            return Err(PlacementError::OutsideTerritory { x, y });
        }

        city.set_tile(x, y, tile_type);
        let territory_claimed = if tile_type == TileType::Empty {
            0
        } else {
            city.expand_territory(x, y, self.placement.claim_radius_for(tile_type))
        };
        info!(x, y, from = %existing, to = %tile_type, territory_claimed, "tile placed");
        Ok(TileChange {
            coordinate: TileCoordinate::new(x, y),
            from: existing,
            to: tile_type,
            territory_claimed,
        })
    }

    pub fn expand_territory(&mut self, x: i32, y: i32, radius: u32) -> usize {
        self.state.city.expand_territory(x, y, radius)
    }
}
