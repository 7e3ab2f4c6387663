//! Seeded terrain: water bodies first, then mountain ranges.
//!
//! Clusters only ever paint empty cells, so earlier features win where two
//! clusters overlap.

use tracing::debug;

use crate::city::{City, TileType};
use crate::rng::SeededRandom;

#[derive(Debug, Clone, Copy)]
pub struct FeaturePass {
    pub tile_type: TileType,
    pub count: (i64, i64),
    pub size: (i64, i64),
}

pub const WATER_PASS: FeaturePass = FeaturePass {
    tile_type: TileType::Water,
    count: (8, 15),
    size: (3, 7),
};

pub const MOUNTAIN_PASS: FeaturePass = FeaturePass {
    tile_type: TileType::Mountain,
    count: (10, 18),
    size: (4, 8),
};

/// Edge noise: each candidate cell gets its own threshold in this band,
/// scaled by the cluster size.
const THRESHOLD_BAND: (f64, f64) = (0.6, 0.9);

pub struct TerrainGenerator {
    rng: SeededRandom,
}

impl TerrainGenerator {
    pub fn new(seed: i64) -> Self {
        Self {
            rng: SeededRandom::new(seed),
        }
    }

    pub fn generate(&mut self, city: &mut City) {
        for pass in [WATER_PASS, MOUNTAIN_PASS] {
            let painted = self.run_pass(city, pass);
            debug!(
                feature = %pass.tile_type,
                painted,
                seed = city.seed(),
                "terrain pass complete"
            );
        }
    }

    /// Draws a cluster count and paints that many clusters of one feature.
    pub fn run_pass(&mut self, city: &mut City, pass: FeaturePass) -> usize {
        let width = city.grid_width() as i64;
        let height = city.grid_height() as i64;
        let clusters = self.rng.int_in_closed_range(pass.count.0, pass.count.1);
        let mut painted = 0;
        for _ in 0..clusters {
            let center_x = self.rng.int_in_range(0, width);
            let center_y = self.rng.int_in_range(0, height);
            let size = self.rng.int_in_closed_range(pass.size.0, pass.size.1);
            painted += self.rasterize_cluster(city, center_x, center_y, size, pass.tile_type);
        }
        painted
    }

    fn rasterize_cluster(
        &mut self,
        city: &mut City,
        center_x: i64,
        center_y: i64,
        size: i64,
        tile_type: TileType,
    ) -> usize {
        let mut painted = 0;
        for dx in -size..=size {
            for dy in -size..=size {
                let (x, y) = ((center_x + dx) as i32, (center_y + dy) as i32);
                if city.tile_type(x, y) != Some(TileType::Empty) {
                    continue;
                }
                let distance = ((dx * dx + dy * dy) as f64).sqrt();
                let threshold =
                    size as f64 * self.rng.double_in_range(THRESHOLD_BAND.0, THRESHOLD_BAND.1);
                if distance < threshold {
                    city.set_tile(x, y, tile_type);
                    painted += 1;
                }
            }
        }
        painted
    }
}
