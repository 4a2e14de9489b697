use std::io::Write;
use std::path::PathBuf;

use battle_content::{ConfigLoader, RosterLoader};
use battle_core::{BattleConfig, BattleController, SelectionStrategy};
use tempfile::NamedTempFile;

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join(name)
}

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn bundled_roster_loads_and_starts_a_battle() {
    let roster = RosterLoader::load(&data_file("roster.ron")).unwrap();
    assert_eq!(roster.attacks.len(), 5);
    assert_eq!(roster.heroes.len(), 2);
    assert_eq!(roster.enemies.len(), 3);

    let mage = &roster.heroes[1];
    assert_eq!(mage.name, "Mage");
    assert_eq!(mage.state_charge, 50.0);
    assert_eq!(mage.attacks[0].name, "Fireball");
    assert_eq!(mage.attacks[0].tokens.fire, 2);
    assert!(roster.attacks.iter().any(|a| a.extending));

    let battle = BattleController::new(BattleConfig::default(), roster.heroes, roster.enemies);
    assert!(battle.is_ok());
}

#[test]
fn bundled_config_matches_defaults() {
    let config = ConfigLoader::load(&data_file("battle.toml")).unwrap();
    assert_eq!(config, BattleConfig::default());
}

#[test]
fn partial_config_keeps_defaults() {
    let file = temp_file("turn_threshold = 500.0\nqueue_length = 4\n");
    let config = ConfigLoader::load(file.path()).unwrap();
    assert_eq!(config.turn_threshold, 500.0);
    assert_eq!(config.queue_length, 4);
    assert_eq!(config.max_charge, BattleConfig::default().max_charge);
}

#[test]
fn invalid_config_is_rejected() {
    let err = ConfigLoader::parse("queue_length = 0").unwrap_err();
    assert!(err.to_string().contains("queue_length"));
}

#[test]
fn unknown_attack_reference_fails() {
    let roster = r#"(
        attacks: [(name: "Slash", damage: 5.0)],
        heroes: [(name: "Knight", max_hp: 10.0, attack: 1.0, defense: 0.0, speed: 10.0, attacks: ["Kick"])],
        enemies: [],
    )"#;
    let err = RosterLoader::parse(roster).unwrap_err();
    assert!(err.to_string().contains("Kick"));
}

#[test]
fn duplicate_attack_names_fail() {
    let roster = r#"(
        attacks: [(name: "Slash", damage: 5.0), (name: "Slash", damage: 6.0)],
        heroes: [],
        enemies: [],
    )"#;
    assert!(RosterLoader::parse(roster).is_err());
}

#[test]
fn template_overrides_are_applied() {
    let roster = r#"(
        attacks: [(name: "Bite", damage: 3.0)],
        heroes: [],
        enemies: [(
            name: "Wounded Wolf",
            max_hp: 30.0,
            hp: Some(12.0),
            attack: 4.0,
            defense: 0.0,
            speed: 20.0,
            initiative: 300.0,
            attacks: ["Bite"],
            strategy: Some(PlayerInput),
        )],
    )"#;
    let file = temp_file(roster);
    let loaded = RosterLoader::load(file.path()).unwrap();

    let wolf = &loaded.enemies[0];
    assert_eq!(wolf.stats.current_hp, 12.0);
    assert_eq!(wolf.stats.max_hp, 30.0);
    assert_eq!(wolf.initiative, 300.0);
    assert_eq!(wolf.strategy, Some(SelectionStrategy::PlayerInput));
}

#[test]
fn missing_file_reports_path() {
    let err = RosterLoader::load(&data_file("does-not-exist.ron")).unwrap_err();
    assert!(err.to_string().contains("does-not-exist.ron"));
}
