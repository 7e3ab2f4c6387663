use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::terrain::TerrainGenerator;

pub const DEFAULT_MONEY: f64 = 5_000.0;
pub const DEFAULT_STABILITY: f64 = 50.0;

/// Residents housed per residential tile.
pub const RESIDENTS_PER_TILE: u64 = 30;
/// Jobs provided per commercial or industrial tile.
pub const JOBS_PER_TILE: u64 = 20;
/// Border cells covered by one military tile.
pub const TILES_SECURED_PER_MILITARY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    Empty,
    Residential,
    Commercial,
    Industrial,
    Park,
    Military,
    Water,
    Mountain,
}

impl TileType {
    pub const ALL: [TileType; 8] = [
        TileType::Empty,
        TileType::Residential,
        TileType::Commercial,
        TileType::Industrial,
        TileType::Park,
        TileType::Military,
        TileType::Water,
        TileType::Mountain,
    ];

    pub fn is_terrain(self) -> bool {
        matches!(self, TileType::Water | TileType::Mountain)
    }

    pub fn label(self) -> &'static str {
        match self {
            TileType::Empty => "empty",
            TileType::Residential => "residential",
            TileType::Commercial => "commercial",
            TileType::Industrial => "industrial",
            TileType::Park => "park",
            TileType::Military => "military",
            TileType::Water => "water",
            TileType::Mountain => "mountain",
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoordinate {
    pub x: i32,
    pub y: i32,
}

impl TileCoordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(self, other: TileCoordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn neighbors4(self) -> [TileCoordinate; 4] {
        [
            TileCoordinate::new(self.x, self.y - 1),
            TileCoordinate::new(self.x, self.y + 1),
            TileCoordinate::new(self.x - 1, self.y),
            TileCoordinate::new(self.x + 1, self.y),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub tile_type: TileType,
}

impl Tile {
    pub fn coordinate(&self) -> TileCoordinate {
        TileCoordinate::new(self.x, self.y)
    }
}

/// Every tile count the simulation step reads, gathered in one grid scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TileCounts {
    pub empty: usize,
    pub residential: usize,
    pub commercial: usize,
    pub industrial: usize,
    pub parks: usize,
    pub military: usize,
    pub water: usize,
    pub mountain: usize,
}

impl TileCounts {
    pub fn of(&self, tile_type: TileType) -> usize {
        match tile_type {
            TileType::Empty => self.empty,
            TileType::Residential => self.residential,
            TileType::Commercial => self.commercial,
            TileType::Industrial => self.industrial,
            TileType::Park => self.parks,
            TileType::Military => self.military,
            TileType::Water => self.water,
            TileType::Mountain => self.mountain,
        }
    }

    fn bump(&mut self, tile_type: TileType) {
        let slot = match tile_type {
            TileType::Empty => &mut self.empty,
            TileType::Residential => &mut self.residential,
            TileType::Commercial => &mut self.commercial,
            TileType::Industrial => &mut self.industrial,
            TileType::Park => &mut self.parks,
            TileType::Military => &mut self.military,
            TileType::Water => &mut self.water,
            TileType::Mountain => &mut self.mountain,
        };
        *slot += 1;
    }

    pub fn population_capacity(&self) -> u64 {
        self.residential as u64 * RESIDENTS_PER_TILE
    }

    pub fn available_jobs(&self) -> u64 {
        (self.commercial + self.industrial) as u64 * JOBS_PER_TILE
    }

    pub fn unemployment(&self, population: u64) -> u64 {
        population.saturating_sub(self.available_jobs())
    }
}

/// Share of the border perimeter covered by military tiles, as a percentage.
///
/// An empty perimeter counts as fully secured. Values above 100 mean surplus
/// coverage.
pub fn border_security(military: usize, perimeter: usize) -> f64 {
    if perimeter == 0 {
        return 100.0;
    }
    let secured = (military * TILES_SECURED_PER_MILITARY) as f64;
    secured / perimeter as f64 * 100.0
}

/// The player's city: tile grid, resource ledger and claimed territory.
///
/// `tiles` is stored row-major (`tiles[y][x]`) and always holds exactly
/// `grid_height` rows of `grid_width` tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    tiles: Vec<Vec<Tile>>,
    pub money: f64,
    pub population: u64,
    stability: f64,
    #[serde(serialize_with = "sorted_coordinates")]
    territory_border: HashSet<TileCoordinate>,
    grid_width: usize,
    grid_height: usize,
    seed: i64,
}

impl City {
    /// Builds a city and runs terrain generation. A missing seed is drawn at
    /// random.
    pub fn new(name: impl Into<String>, width: usize, height: usize, seed: Option<i64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        let mut city = Self::blank(name, width, height, seed);
        TerrainGenerator::new(seed).generate(&mut city);
        city
    }

    /// Builds an all-empty city without running terrain generation.
    pub fn blank(name: impl Into<String>, width: usize, height: usize, seed: i64) -> Self {
        let mut next_id = 0u32;
        let tiles = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        let tile = Tile {
                            id: next_id,
                            x: x as i32,
                            y: y as i32,
                            tile_type: TileType::Empty,
                        };
                        next_id += 1;
                        tile
                    })
                    .collect()
            })
            .collect();
        Self {
            name: name.into(),
            tiles,
            money: DEFAULT_MONEY,
            population: 0,
            stability: DEFAULT_STABILITY,
            territory_border: HashSet::new(),
            grid_width: width,
            grid_height: height,
            seed,
        }
    }

    pub fn grid_width(&self) -> usize {
        self.grid_width
    }

    pub fn grid_height(&self) -> usize {
        self.grid_height
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn stability(&self) -> f64 {
        self.stability
    }

    pub fn set_stability(&mut self, value: f64) {
        self.stability = value.clamp(0.0, 100.0);
    }

    pub fn adjust_stability(&mut self, delta: f64) {
        self.set_stability(self.stability + delta);
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.grid_width && (y as usize) < self.grid_height
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.tiles
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
    }

    pub fn tile_type(&self, x: i32, y: i32) -> Option<TileType> {
        self.tile(x, y).map(|tile| tile.tile_type)
    }

    /// Unchecked mutation: no terrain or territory policy is applied here.
    /// Returns the previous type, or `None` when out of range.
    pub fn set_tile(&mut self, x: i32, y: i32, tile_type: TileType) -> Option<TileType> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let tile = self
            .tiles
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))?;
        let previous = tile.tile_type;
        tile.tile_type = tile_type;
        Some(previous)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    pub fn count_tiles(&self, tile_type: TileType) -> usize {
        self.tiles().filter(|tile| tile.tile_type == tile_type).count()
    }

    pub fn tile_counts(&self) -> TileCounts {
        let mut counts = TileCounts::default();
        for tile in self.tiles() {
            counts.bump(tile.tile_type);
        }
        counts
    }

    pub fn population_capacity(&self) -> u64 {
        self.count_tiles(TileType::Residential) as u64 * RESIDENTS_PER_TILE
    }

    pub fn unemployment(&self) -> u64 {
        self.tile_counts().unemployment(self.population)
    }

    /// Claims `(x, y)` plus every in-bounds cell within Manhattan distance
    /// `radius` of it. The centre is claimed even when it lies off the grid.
    pub fn expand_territory(&mut self, x: i32, y: i32, radius: u32) -> usize {
        let center = TileCoordinate::new(x, y);
        let mut added = usize::from(self.territory_border.insert(center));

        // Scan only where the diamond overlaps the grid.
        let (cx, cy, reach) = (i64::from(x), i64::from(y), i64::from(radius));
        let x_range = (cx - reach).max(0)..=(cx + reach).min(self.grid_width as i64 - 1);
        for cell_x in x_range {
            let left = reach - (cell_x - cx).abs();
            let y_range = (cy - left).max(0)..=(cy + left).min(self.grid_height as i64 - 1);
            for cell_y in y_range {
                let cell = TileCoordinate::new(cell_x as i32, cell_y as i32);
                if self.territory_border.insert(cell) {
                    added += 1;
                }
            }
        }
        added
    }

    pub fn is_within_territory(&self, x: i32, y: i32) -> bool {
        self.territory_border.contains(&TileCoordinate::new(x, y))
    }

    pub fn territory(&self) -> &HashSet<TileCoordinate> {
        &self.territory_border
    }

    /// Territory cells touching the grid edge or unclaimed land.
    pub fn calculate_border_perimeter(&self) -> usize {
        self.territory_border
            .iter()
            .filter(|cell| {
                cell.neighbors4().iter().any(|n| {
                    !self.in_bounds(n.x, n.y) || !self.territory_border.contains(n)
                })
            })
            .count()
    }

    pub fn border_security(&self) -> f64 {
        border_security(
            self.count_tiles(TileType::Military),
            self.calculate_border_perimeter(),
        )
    }

    /// Checks the grid shape and coordinates, for data that did not come from
    /// a constructor.
    pub fn validate(&self) -> Result<(), String> {
        if self.tiles.len() != self.grid_height {
            return Err(format!(
                "expected {} rows, found {}",
                self.grid_height,
                self.tiles.len()
            ));
        }
        for (y, row) in self.tiles.iter().enumerate() {
            if row.len() != self.grid_width {
                return Err(format!(
                    "row {y} has {} tiles, expected {}",
                    row.len(),
                    self.grid_width
                ));
            }
            for (x, tile) in row.iter().enumerate() {
                if tile.x != x as i32 || tile.y != y as i32 {
                    return Err(format!(
                        "tile at ({x}, {y}) claims coordinate ({}, {})",
                        tile.x, tile.y
                    ));
                }
            }
        }
        if !(0.0..=100.0).contains(&self.stability) {
            return Err(format!("stability {} outside 0..=100", self.stability));
        }
        Ok(())
    }
}

fn sorted_coordinates<S>(set: &HashSet<TileCoordinate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut cells: Vec<&TileCoordinate> = set.iter().collect();
    cells.sort();
    serializer.collect_seq(cells)
}
