use thiserror::Error;

use crate::city::TileType;

/// Why a player placement was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("tile ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },

    #[error("tile ({x}, {y}) is {existing} terrain and cannot be built on")]
    TerrainImmutable { x: i32, y: i32, existing: TileType },

    #[error("{0} is terrain and cannot be placed")]
    TerrainNotPlaceable(TileType),

    #[error("tile ({x}, {y}) is outside the city's territory")]
    OutsideTerritory { x: i32, y: i32 },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported catalog format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    #[error("event id '{0}' defined more than once")]
    DuplicateEventId(String),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
}
