use std::collections::HashSet;

use citysim::{
    catalog::EventCatalog,
    city::TileCoordinate,
    snapshot::{self, SaveGame},
    world::{PlacementRules, World, WorldSettings},
    TileType,
};
use tempfile::tempdir;

fn played_world() -> World {
    let mut world = World::with_settings(
        WorldSettings {
            width: 30,
            height: 30,
            seed: Some(404),
            generate_terrain: true,
            territory_center: Some(TileCoordinate::new(15, 15)),
            territory_radius: 10,
            ..WorldSettings::default()
        },
        EventCatalog::builtin(),
    );
    // Find somewhere buildable near the centre; terrain is seed dependent.
    let spots: Vec<(i32, i32)> = world
        .city()
        .tiles()
        .filter(|t| t.tile_type == TileType::Empty)
        .filter(|t| world.city().is_within_territory(t.x, t.y))
        .map(|t| (t.x, t.y))
        .take(3)
        .collect();
    assert_eq!(spots.len(), 3, "seed 404 should leave room to build");
    world.place_tile(spots[0].0, spots[0].1, TileType::Residential).unwrap();
    world.place_tile(spots[1].0, spots[1].1, TileType::Commercial).unwrap();
    world.place_tile(spots[2].0, spots[2].1, TileType::Military).unwrap();
    for _ in 0..20 {
        world.simulate(1.0);
    }
    world
}

#[test]
fn save_and_load_restore_persisted_state() {
    let world = played_world();
    let dir = tempdir().unwrap();
    let path = dir.path().join("saves").join("slot1.json");

    snapshot::save_state(&path, 20, world.state()).unwrap();
    let save = snapshot::load_state(&path).unwrap();

    assert_eq!(save.tick, 20);
    let (before, after) = (&world.state().city, &save.state.city);
    assert_eq!(after.name, before.name);
    assert_eq!(after.seed(), before.seed());
    assert_eq!(after.population, before.population);
    assert_eq!(after.money, before.money);
    assert_eq!(after.stability(), before.stability());
    assert_eq!(after.territory(), before.territory());
    assert_eq!(
        after.tiles().map(|t| t.tile_type).collect::<Vec<_>>(),
        before.tiles().map(|t| t.tile_type).collect::<Vec<_>>()
    );
    assert_eq!(
        save.state.global.world_tension(),
        world.global().world_tension()
    );
    assert_eq!(save.state.global.neighbors, world.global().neighbors);
}

#[test]
fn active_event_is_not_persisted() {
    let mut world = played_world();
    let mut spawned = false;
    for _ in 0..200 {
        if world.spawn_event_if_needed().is_some() {
            spawned = true;
            break;
        }
    }
    assert!(spawned);

    let json = SaveGame::new(1, world.state().clone()).to_json().unwrap();
    let event_id = world.current_event().unwrap().id.clone();
    assert!(!json.contains(&event_id));

    let restored = World::from_state(
        SaveGame::from_json(&json).unwrap().state,
        EventCatalog::builtin(),
        PlacementRules::default(),
    );
    assert!(restored.current_event().is_none());
}

#[test]
fn duplicate_territory_entries_collapse_into_a_set() {
    let world = played_world();
    let json = SaveGame::new(1, world.state().clone()).to_json().unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let border = value["state"]["city"]["territory_border"]
        .as_array_mut()
        .unwrap();
    let first = border[0].clone();
    border.push(first.clone());
    border.push(first);

    let save = SaveGame::from_json(&value.to_string()).unwrap();
    let expected: HashSet<TileCoordinate> = world.city().territory().clone();
    assert_eq!(save.state.city.territory(), &expected);
}

#[test]
fn missing_save_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = snapshot::load_state(dir.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("io error"));
}

fn roll_pattern(world: &mut World) -> Vec<Option<String>> {
    (0..64)
        .map(|_| {
            let id = world.spawn_event_if_needed().map(|e| e.id.clone());
            world.resolve_current(0);
            id
        })
        .collect()
}

#[test]
fn resumed_world_does_not_replay_opening_rolls() {
    let world = played_world();
    let json = SaveGame::new(240, world.state().clone()).to_json().unwrap();
    let restore = || {
        World::from_state(
            SaveGame::from_json(&json).unwrap().state,
            EventCatalog::builtin(),
            PlacementRules::default(),
        )
    };

    let mut fresh = restore();
    let mut resumed = restore();
    resumed.resume_at(240);
    assert_ne!(roll_pattern(&mut fresh), roll_pattern(&mut resumed));

    let mut at_start = restore();
    at_start.resume_at(0);
    let mut fresh_again = restore();
    assert_eq!(roll_pattern(&mut at_start), roll_pattern(&mut fresh_again));
}
