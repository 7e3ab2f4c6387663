use std::path::PathBuf;

use citysim::{
    catalog::EventCatalog,
    driver::{ChoicePolicy, Driver, DriverSettings},
    events::{EventChoice, EventConditions, EventType, GameEvent},
    scenario::ScenarioLoader,
    snapshot::SnapshotWriter,
    world::{World, WorldSettings},
    TileType,
};
use tempfile::tempdir;

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn scenario_path() -> PathBuf {
    PathBuf::from("scenarios/valley.yaml")
}

fn open_event() -> GameEvent {
    GameEvent {
        id: "open".into(),
        title: "Open".into(),
        description: String::new(),
        choices: vec![EventChoice {
            id: "open.take".into(),
            text: "Take".into(),
            money_change: Some(1.0),
            stability_change: None,
            world_tension_change: None,
        }],
        event_type: EventType::Neutral,
        conditions: EventConditions::default(),
    }
}

fn small_world(catalog: EventCatalog) -> World {
    let mut world = World::with_settings(
        WorldSettings {
            width: 12,
            height: 12,
            seed: Some(8),
            generate_terrain: false,
            ..WorldSettings::default()
        },
        catalog,
    );
    world.place_tile(6, 6, TileType::Residential).unwrap();
    world
}

#[test]
fn scenario_loader_reads_fixture() {
    let scenario = scenario_loader().load(scenario_path()).expect("scenario parses");
    assert_eq!(scenario.name, "valley");
    assert_eq!(scenario.width, 40);
    assert_eq!(scenario.placements.len(), 8);
    assert_eq!(scenario.choice_policy, ChoicePolicy::First);

    let world = scenario.build_world().unwrap();
    let counts = world.city().tile_counts();
    assert_eq!(counts.residential, 4);
    assert_eq!(counts.military, 1);
    assert_eq!(world.city().name, "Riverside");
    assert_eq!(world.city().money, 2000.0);
    assert_eq!(world.global().world_tension(), 20.0);
}

#[test]
fn frontier_scenario_loads_yaml_catalog() {
    let scenario = scenario_loader()
        .load("scenarios/frontier.yaml")
        .unwrap();
    let catalog = scenario.catalog();
    assert_eq!(catalog.len(), 3);
    assert!(catalog.get("raiders-sighted").is_some());
    assert_eq!(scenario.politics.neighbors.len(), 3);
    assert_eq!(scenario.placement.military_claim_radius, 5);
}

#[test]
fn broken_catalog_means_no_events_not_failure() {
    let scenario = scenario_loader()
        .load("scenarios/broken_events.yaml")
        .unwrap();
    let world = scenario.build_world().unwrap();
    assert!(world.catalog().is_empty());

    let mut driver = Driver::new(world, scenario.driver_settings(), scenario.name.clone());
    let summary = driver.run(scenario.ticks).unwrap();
    assert_eq!(summary.events_spawned, 0);
    assert!(summary.vitals.population > 0);
}

#[test]
fn runs_are_deterministic() {
    let scenario = scenario_loader().load(scenario_path()).unwrap();
    let run = || {
        let world = scenario.build_world().unwrap();
        let mut driver = Driver::new(world, scenario.driver_settings(), scenario.name.clone());
        let summary = driver.run(90).unwrap();
        (summary.vitals, summary.events_spawned)
    };
    let (a, events_a) = run();
    let (b, events_b) = run();
    assert_eq!(a, b);
    assert_eq!(events_a, events_b);
}

#[test]
fn event_rolls_follow_real_time_not_game_speed() {
    let settings = DriverSettings {
        tick_seconds: 1.0,
        speed: 4.0,
        event_interval_seconds: 10.0,
        choice_policy: ChoicePolicy::Skip,
    };
    let mut driver = Driver::new(
        small_world(EventCatalog::new(vec![open_event()])),
        settings,
        "cadence",
    );
    let mut roll_ticks = Vec::new();
    for _ in 0..200 {
        let outcome = driver.advance(1.0);
        if let Some(id) = outcome.spawned {
            assert_eq!(id, "open");
            roll_ticks.push(driver.tick());
            break;
        }
    }
    let tick = roll_ticks.first().copied().expect("an event eventually spawns");
    assert_eq!(tick % 10, 0, "spawn happened off-cadence at tick {tick}");
}

#[test]
fn speed_scales_simulated_time() {
    let settings = DriverSettings {
        speed: 3.0,
        ..DriverSettings::default()
    };
    let mut driver = Driver::new(small_world(EventCatalog::empty()), settings, "speed");
    driver.world_mut().city_mut().set_stability(50.0);
    let outcome = driver.advance(1.0);
    // One home, stability 50: floor(1 * 2 * 3.0 * 1.0) = 6.
    assert_eq!(outcome.report.after.population, 6);
}

#[test]
fn skip_policy_leaves_event_open() {
    let settings = DriverSettings {
        event_interval_seconds: 1.0,
        choice_policy: ChoicePolicy::Skip,
        ..DriverSettings::default()
    };
    let mut driver = Driver::new(
        small_world(EventCatalog::new(vec![open_event()])),
        settings,
        "skip",
    );
    let summary = driver.run(100).unwrap();
    assert_eq!(summary.events_spawned, 1);
    assert_eq!(summary.events_resolved, 0);
    assert!(driver.world().current_event().is_some());
}

#[test]
fn first_policy_resolves_immediately() {
    let settings = DriverSettings {
        event_interval_seconds: 1.0,
        choice_policy: ChoicePolicy::First,
        ..DriverSettings::default()
    };
    let mut driver = Driver::new(
        small_world(EventCatalog::new(vec![open_event()])),
        settings,
        "first",
    );
    let summary = driver.run(100).unwrap();
    assert!(summary.events_spawned > 1);
    assert_eq!(summary.events_spawned, summary.events_resolved);
    assert!(driver.world().current_event().is_none());
}

#[test]
fn snapshots_are_written_on_interval() {
    let scenario = scenario_loader().load(scenario_path()).unwrap();
    let temp = tempdir().unwrap();
    let snapshot_dir = temp.path().join("snaps");
    let world = scenario.build_world().unwrap();
    let mut driver = Driver::new(world, scenario.driver_settings(), scenario.name.clone())
        .with_snapshots(SnapshotWriter::new(&snapshot_dir, 10));
    let summary = driver.run(30).unwrap();

    assert_eq!(summary.snapshots.len(), 3);
    let expected = snapshot_dir.join("valley").join("tick_000010.json");
    assert!(expected.exists(), "expected snapshot {}", expected.display());
    let data = std::fs::read_to_string(expected).unwrap();
    assert!(data.contains("\"name\": \"Riverside\""));
    assert!(!data.contains("current_event"));
}

#[test]
fn resumed_driver_continues_tick_count_with_fresh_rolls() {
    let settings = DriverSettings {
        event_interval_seconds: 1.0,
        choice_policy: ChoicePolicy::First,
        ..DriverSettings::default()
    };
    let catalog = || EventCatalog::new(vec![open_event()]);
    let spawn_ticks = |driver: &mut Driver| -> Vec<bool> {
        (0..64).map(|_| driver.advance(1.0).spawned.is_some()).collect()
    };

    let mut fresh = Driver::new(small_world(catalog()), settings, "fresh");
    let mut resumed =
        Driver::new(small_world(catalog()), settings, "resumed").starting_at(300);
    assert_eq!(resumed.tick(), 300);
    assert_ne!(spawn_ticks(&mut fresh), spawn_ticks(&mut resumed));
    assert_eq!(resumed.tick(), 364);
}
