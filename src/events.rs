//! Narrative events: trigger conditions, player choices and selection.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::city::{City, TileCounts};

/// Chance that a spawn attempt produces an event at all.
pub const SPAWN_PROBABILITY: f64 = 0.3;

/// Population share of capacity at which `populationNearCap` holds.
pub const NEAR_CAP_RATIO: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Good,
    Political,
    Riot,
    Neutral,
}

/// The city figures event conditions are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventMetrics {
    pub population: u64,
    pub stability: f64,
    pub residential: usize,
    pub commercial: usize,
    pub industrial: usize,
    pub parks: usize,
    pub unemployment: u64,
    pub population_capacity: u64,
}

impl EventMetrics {
    pub fn from_city(city: &City, counts: &TileCounts) -> Self {
        Self {
            population: city.population,
            stability: city.stability(),
            residential: counts.residential,
            commercial: counts.commercial,
            industrial: counts.industrial,
            parks: counts.parks,
            unemployment: counts.unemployment(city.population),
            population_capacity: counts.population_capacity(),
        }
    }

    pub fn is_near_capacity(&self) -> bool {
        self.population_capacity > 0
            && self.population as f64 >= self.population_capacity as f64 * NEAR_CAP_RATIO
    }
}

/// Optional thresholds; an absent field imposes no constraint. Minimums and
/// maximums are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_population: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_population: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_residential: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_commercial: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_industrial: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_unemployment: Option<u64>,
    /// `true` requires the population to be near capacity; `false` is the
    /// same as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_near_cap: Option<bool>,
}

impl EventConditions {
    pub fn is_met(&self, metrics: &EventMetrics) -> bool {
        fn at_least<T: PartialOrd>(bound: Option<T>, value: T) -> bool {
            bound.map_or(true, |min| value >= min)
        }
        fn at_most<T: PartialOrd>(bound: Option<T>, value: T) -> bool {
            bound.map_or(true, |max| value <= max)
        }

        at_least(self.min_population, metrics.population)
            && at_most(self.max_population, metrics.population)
            && at_least(self.min_stability, metrics.stability)
            && at_most(self.max_stability, metrics.stability)
            && at_least(self.min_residential, metrics.residential)
            && at_least(self.min_commercial, metrics.commercial)
            && at_least(self.min_industrial, metrics.industrial)
            && at_most(self.max_parks, metrics.parks)
            && at_least(self.min_unemployment, metrics.unemployment)
            && (self.population_near_cap != Some(true) || metrics.is_near_capacity())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChoice {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub money_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_tension_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub choices: Vec<EventChoice>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(flatten)]
    pub conditions: EventConditions,
}

/// Uniform pick among the events whose conditions hold.
pub fn select_event<'a, R>(
    catalog: &'a [GameEvent],
    metrics: &EventMetrics,
    rng: &mut R,
) -> Option<&'a GameEvent>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<&GameEvent> = catalog
        .iter()
        .filter(|event| event.conditions.is_met(metrics))
        .collect();
    eligible.choose(rng).copied()
}
