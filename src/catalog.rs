//! Loading the external event catalog.
//!
//! Records follow the camelCase layout the content files use. A choice
//! without an `id` gets one synthesized from its event id and position.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::events::{EventChoice, EventConditions, EventType, GameEvent};

const BUILTIN_CATALOG: &str = include_str!("../data/events.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    id: String,
    title: String,
    description: String,
    #[serde(rename = "type")]
    event_type: EventType,
    #[serde(default)]
    choices: Vec<ChoiceRecord>,
    #[serde(flatten)]
    conditions: EventConditions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChoiceRecord {
    #[serde(default)]
    id: Option<String>,
    text: String,
    #[serde(default)]
    money_change: Option<f64>,
    #[serde(default)]
    stability_change: Option<f64>,
    #[serde(default)]
    world_tension_change: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: Vec<GameEvent>,
}

impl EventCatalog {
    pub fn new(events: Vec<GameEvent>) -> Self {
        Self { events }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_CATALOG).unwrap_or_else(|err| {
            warn!(error = %err, "built-in event catalog failed to parse; events disabled");
            Self::empty()
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let text = fs::read_to_string(path)?;
        let catalog = match extension.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };
        info!(path = %path.display(), events = catalog.len(), "event catalog loaded");
        Ok(catalog)
    }

    /// Loads a catalog, falling back to an empty one on any failure so the
    /// game keeps running without events.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "event catalog unavailable; events disabled");
            Self::empty()
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let records: Vec<EventRecord> = serde_json::from_str(text)?;
        Self::from_records(records)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let records: Vec<EventRecord> = serde_yaml::from_str(text)?;
        Self::from_records(records)
    }

    fn from_records(records: Vec<EventRecord>) -> Result<Self, CatalogError> {
        let mut event_ids = HashSet::new();
        for record in &records {
            if !event_ids.insert(record.id.clone()) {
                return Err(CatalogError::DuplicateEventId(record.id.clone()));
            }
        }

        let mut choice_ids: HashSet<String> = records
            .iter()
            .flat_map(|record| record.choices.iter().filter_map(|c| c.id.clone()))
            .collect();

        let events = records
            .into_iter()
            .map(|record| {
                let choices = record
                    .choices
                    .into_iter()
                    .enumerate()
                    .map(|(index, choice)| {
                        let id = match choice.id {
                            Some(id) => id,
                            None => synthesize_choice_id(&record.id, index, &mut choice_ids),
                        };
                        EventChoice {
                            id,
                            text: choice.text,
                            money_change: choice.money_change,
                            stability_change: choice.stability_change,
                            world_tension_change: choice.world_tension_change,
                        }
                    })
                    .collect();
                GameEvent {
                    id: record.id,
                    title: record.title,
                    description: record.description,
                    choices,
                    event_type: record.event_type,
                    conditions: record.conditions,
                }
            })
            .collect();
        Ok(Self { events })
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&GameEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn synthesize_choice_id(event_id: &str, index: usize, taken: &mut HashSet<String>) -> String {
    let base = format!("{event_id}.choice-{index}");
    let mut candidate = base.clone();
    let mut suffix = 1;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    candidate
}
