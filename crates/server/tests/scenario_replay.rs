use std::io::Write;
use std::path::Path;

use game_core::{EntityId, Hand, ItemKind, ItemStack, Location};
use tempfile::NamedTempFile;
use totem_runtime::{AbortReason, EventBus, RevivalConfig, RevivalEvent};
use totem_server::{Report, Scenario, ScenarioError, Simulation};

fn replay(scenario: &Scenario) -> Report {
    let mut sim = Simulation::new(scenario, RevivalConfig::default(), EventBus::new());
    sim.run(&scenario.steps).expect("scenario runs");
    sim.finish()
}

fn write_scenario(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write scenario");
    file
}

#[test]
fn bundled_scenario_revives_ghost_player() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/ghost_totem.ron");
    let scenario = Scenario::load_from_file(&path).expect("bundled scenario parses");

    let report = replay(&scenario);
    assert_eq!(report.ticks, 2);

    let steve = &report.players[0];
    assert_eq!(steve.name, "Steve");
    assert!(steve.alive);
    assert_eq!(steve.health, 1.0);
    assert_eq!(steve.location.x, 120.5);
    assert_eq!(steve.location.z, -33.5);
    assert_eq!(steve.hands.off_hand, None);
    assert_eq!(steve.hands.main_hand, Some(ItemStack::new(ItemKind::Sword, 1)));
    assert_eq!(steve.level, 12);
    assert_eq!(steve.effects.len(), 3);
    assert!(!steve.pending_save);
    assert!(!steve.on_cooldown);

    let alex = &report.players[1];
    assert!(alex.alive);
    assert!(!alex.online);
    assert_eq!(alex.hands.off_hand, None);
    assert_eq!(report.host_saves.len(), 1);
    assert_eq!(report.host_saves[0].entity, EntityId(2));
    assert_eq!(report.host_saves[0].hand, Hand::OffHand);

    let sam = &report.players[2];
    assert!(sam.alive);
    assert_eq!(sam.location, Location::new("world", 2.5, 65.0, 2.5));
    assert_eq!(sam.hands.main_hand, None);
    assert_eq!(sam.level, 0);

    assert_eq!(report.deaths.len(), 2);
    let steve_death = &report.deaths[0];
    assert!(steve_death.kept_inventory);
    assert!(steve_death.drops.is_empty());
    assert_eq!(steve_death.message, None);
    assert_eq!(steve_death.dropped_exp, 0);

    let sam_death = &report.deaths[1];
    assert!(!sam_death.kept_inventory);
    assert_eq!(sam_death.drops, vec![ItemStack::new(ItemKind::Torch, 16)]);
    assert_eq!(sam_death.dropped_exp, 35);
    assert_eq!(sam_death.message.as_deref(), Some("Sam died"));

    assert!(report.outcomes.contains(&RevivalEvent::ItemConsumed {
        entity: EntityId(1),
        hand: Hand::OffHand,
    }));
    assert!(
        report
            .outcomes
            .iter()
            .any(|event| matches!(event, RevivalEvent::Revived { entity, .. } if *entity == EntityId(1)))
    );
}

#[test]
fn cancelled_damage_is_not_tracked() {
    let file = write_scenario(
        r#"
        Scenario(
            name: "cancelled hit",
            players: [
                (
                    id: 1,
                    name: "Steve",
                    health: 6.0,
                    location: (world: "world", x: 0.0, y: 64.0, z: 0.0),
                    off_hand: Some((kind: TotemOfUndying, amount: 1)),
                    ghost: true,
                ),
            ],
            steps: [
                // cancelled hits are never seen by the watcher
                Damage(player: 1, amount: 10.0, cancelled: true),
                Damage(player: 1, amount: 1.0),
                Damage(player: 1, amount: 9.0),
            ],
        )
        "#,
    );
    let scenario = Scenario::load_from_file(file.path()).expect("scenario parses");

    let report = replay(&scenario);

    let steve = &report.players[0];
    assert!(!steve.alive);
    assert!(steve.pending_save);
    assert_eq!(report.deaths.len(), 1);
    assert!(report.deaths[0].kept_inventory);

    let detections = report
        .outcomes
        .iter()
        .filter(|event| matches!(event, RevivalEvent::LethalDamageDetected { .. }))
        .count();
    assert_eq!(detections, 1);
}

#[test]
fn disconnect_before_forced_respawn_abandons_revival() {
    let file = write_scenario(
        r#"
        Scenario(
            name: "rage quit",
            players: [
                (
                    id: 4,
                    name: "Kai",
                    health: 1.0,
                    location: (world: "world", x: 0.0, y: 64.0, z: 0.0),
                    main_hand: Some((kind: TotemOfUndying, amount: 2)),
                    ghost: true,
                ),
            ],
            steps: [
                Damage(player: 4, amount: 3.0),
                Quit(player: 4),
                Tick(3),
                Join(player: 4),
            ],
        )
        "#,
    );
    let scenario = Scenario::load_from_file(file.path()).expect("scenario parses");

    let report = replay(&scenario);

    let kai = &report.players[0];
    assert!(!kai.alive);
    assert!(kai.online);
    assert!(!kai.pending_save);
    assert_eq!(kai.hands.main_hand, Some(ItemStack::new(ItemKind::TotemOfUndying, 1)));
    assert!(
        !report
            .outcomes
            .iter()
            .any(|event| matches!(event, RevivalEvent::RespawnForced { .. }))
    );
}

#[test]
fn platform_without_forced_respawn_leaves_player_dead() {
    let file = write_scenario(
        r#"
        Scenario(
            name: "vanilla platform",
            platform: (name: "vanilla", version: "1.21", forced_respawn: false),
            players: [
                (
                    id: 1,
                    name: "Steve",
                    health: 1.0,
                    location: (world: "world", x: 0.0, y: 64.0, z: 0.0),
                    off_hand: Some((kind: TotemOfUndying, amount: 1)),
                    ghost: true,
                ),
            ],
            steps: [Damage(player: 1, amount: 3.0), Tick(1)],
        )
        "#,
    );
    let scenario = Scenario::load_from_file(file.path()).expect("scenario parses");

    let report = replay(&scenario);

    assert!(!report.players[0].alive);
    assert!(report.outcomes.contains(&RevivalEvent::RevivalAborted {
        entity: EntityId(1),
        reason: AbortReason::RespawnFailed,
    }));
}

#[test]
fn manual_respawn_of_revived_player_is_ignored() {
    let file = write_scenario(
        r#"
        Scenario(
            name: "double click",
            players: [
                (
                    id: 1,
                    name: "Steve",
                    health: 1.0,
                    location: (world: "world", x: 5.0, y: 64.0, z: 5.0),
                    off_hand: Some((kind: TotemOfUndying, amount: 1)),
                    ghost: true,
                ),
            ],
            steps: [Damage(player: 1, amount: 3.0), Tick(1), Respawn(player: 1), Tick(1)],
        )
        "#,
    );
    let scenario = Scenario::load_from_file(file.path()).expect("scenario parses");

    let report = replay(&scenario);

    let steve = &report.players[0];
    assert!(steve.alive);
    assert_eq!(steve.location, Location::new("world", 5.0, 64.0, 5.0));
    assert!(steve.on_cooldown);
}

#[test]
fn long_tick_step_keeps_every_outcome_on_a_small_bus() {
    let scenario = Scenario::from_ron(
        r#"
        Scenario(
            name: "crowd",
            players: [
                (id: 1, name: "Steve", health: 1.0, location: (world: "world", x: 0.0, y: 64.0, z: 0.0),
                 off_hand: Some((kind: TotemOfUndying, amount: 1)), ghost: true),
                (id: 2, name: "Alex", health: 1.0, location: (world: "world", x: 4.0, y: 64.0, z: 0.0),
                 off_hand: Some((kind: TotemOfUndying, amount: 1)), ghost: true),
                (id: 3, name: "Kai", health: 1.0, location: (world: "world", x: 8.0, y: 64.0, z: 0.0),
                 off_hand: Some((kind: TotemOfUndying, amount: 1)), ghost: true),
            ],
            steps: [
                Damage(player: 1, amount: 3.0),
                Damage(player: 2, amount: 3.0),
                Damage(player: 3, amount: 3.0),
                Tick(4),
            ],
        )
        "#,
        "inline",
    )
    .expect("scenario parses");

    let mut sim = Simulation::new(&scenario, RevivalConfig::default(), EventBus::with_capacity(4));
    sim.run(&scenario.steps).expect("scenario runs");
    let report = sim.finish();

    assert_eq!(report.outcomes.len(), 12);
    let revived = report
        .outcomes
        .iter()
        .filter(|event| matches!(event, RevivalEvent::Revived { .. }))
        .count();
    assert_eq!(revived, 3);
    assert!(report.players.iter().all(|player| player.alive));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Scenario::load_from_file(&dir.path().join("absent.ron")).unwrap_err();

    assert!(matches!(err, ScenarioError::Read { .. }));
}
