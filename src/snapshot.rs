use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SnapshotError;
use crate::world::WorldState;

pub const FORMAT_VERSION: u32 = 1;

/// On-disk save document. Only the persisted world state is stored; an
/// active event is never written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub tick: u64,
    pub state: WorldState,
}

impl SaveGame {
    pub fn new(tick: u64, state: WorldState) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            saved_at: Utc::now(),
            tick,
            state,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let save: SaveGame = serde_json::from_str(text)?;
        if save.format_version != FORMAT_VERSION {
            return Err(SnapshotError::Corrupt(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                save.format_version
            )));
        }
        save.state.validate().map_err(SnapshotError::Corrupt)?;
        Ok(save)
    }
}

pub fn save_state(
    path: impl AsRef<Path>,
    tick: u64,
    state: &WorldState,
) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = SaveGame::new(tick, state.clone()).to_json()?;
    fs::write(path, json)?;
    info!(path = %path.display(), tick, "world saved");
    Ok(())
}

pub fn load_state(path: impl AsRef<Path>) -> Result<SaveGame, SnapshotError> {
    let text = fs::read_to_string(path)?;
    SaveGame::from_json(&text)
}

/// Writes `tick_NNNNNN.json` under `<dir>/<scenario>/` every `interval` ticks.
/// An interval of zero disables snapshots.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(
        &self,
        tick: u64,
        scenario_name: &str,
        state: &WorldState,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if self.interval == 0 || tick == 0 || tick % self.interval != 0 {
            return Ok(None);
        }
        let file_path = self
            .dir
            .join(scenario_name)
            .join(format!("tick_{tick:06}.json"));
        save_state(&file_path, tick, state)?;
        Ok(Some(file_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::{City, TileType};
    use crate::politics::GlobalState;

    fn state() -> WorldState {
        let mut city = City::new("Saved", 12, 12, Some(8));
        city.expand_territory(6, 6, 2);
        city.set_tile(6, 6, TileType::Residential);
        city.population = 17;
        WorldState {
            city,
            global: GlobalState::default(),
        }
    }

    #[test]
    fn writer_respects_interval() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 5);
        let state = state();
        assert!(writer.maybe_write(0, "s", &state).unwrap().is_none());
        assert!(writer.maybe_write(4, "s", &state).unwrap().is_none());
        let path = writer.maybe_write(10, "s", &state).unwrap().unwrap();
        assert!(path.ends_with("s/tick_000010.json"));
        assert!(path.exists());
    }

    #[test]
    fn disabled_writer_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 0);
        assert!(writer.maybe_write(30, "s", &state()).unwrap().is_none());
    }

    #[test]
    fn saved_document_has_no_event_field() {
        let json = SaveGame::new(3, state()).to_json().unwrap();
        assert!(!json.contains("current_event"));
        assert!(json.contains("\"territory_border\""));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut save = SaveGame::new(1, state());
        save.format_version = 99;
        let json = serde_json::to_string(&save).unwrap();
        assert!(matches!(
            SaveGame::from_json(&json),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let json = SaveGame::new(1, state()).to_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["state"]["city"]["grid_width"] = serde_json::json!(13);
        let err = SaveGame::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt(_)), "{err}");
    }
}
