use std::sync::Arc;

use battle_core::{
    ActionIntent, Attack, BattleConfig, BattleController, BattleEvent, BattleOutcome, CombatStats,
    CombatantId, CombatantSpec, Position, SelectionStrategy,
};

const MAX_TICKS: usize = 5_000;

fn fighter(name: &str, stats: CombatStats, position: Position) -> CombatantSpec {
    CombatantSpec::new(
        name,
        stats,
        vec![
            Arc::new(Attack::new("Slash", 5.0).with_charge(25.0)),
            Arc::new(Attack::new("Focus", 2.0).with_charge(40.0).extending()),
        ],
    )
    .at(position)
    .with_strategy(SelectionStrategy::RandomAi)
}

fn skirmish(seed: u64) -> BattleController {
    let heroes = vec![
        fighter("Knight", CombatStats::new(60.0, 8.0, 2.0, 30.0), Position::new(0.0, 0.0)),
        fighter("Ranger", CombatStats::new(45.0, 9.0, 1.0, 45.0), Position::new(0.0, 1.5)),
    ];
    let enemies = vec![
        fighter("Orc", CombatStats::new(50.0, 7.0, 1.0, 35.0), Position::new(8.0, 0.0)),
        fighter("Goblin", CombatStats::new(35.0, 6.0, 0.0, 25.0), Position::new(8.0, 1.5)),
    ];
    BattleController::new(BattleConfig::default(), heroes, enemies)
        .unwrap()
        .with_seed(seed)
}

fn assert_invariants(battle: &BattleController) {
    let state = battle.state();
    let max_charge = battle.config().max_charge;

    assert!(state.roster.is_consistent());
    for combatant in &state.combatants {
        assert!(combatant.stats.current_hp >= 0.0);
        assert!(combatant.stats.current_hp <= combatant.stats.max_hp);
        assert!((0.0..=max_charge).contains(&combatant.dual_state.charge));
        if state.roster.contains(combatant.id) {
            assert!(combatant.is_alive());
        }
    }
    for queued in battle.lookahead() {
        assert!(state.roster.contains(*queued));
    }
}

fn run_collecting(battle: &mut BattleController) -> Vec<BattleEvent> {
    let mut events = battle.drain_events();
    for _ in 0..MAX_TICKS {
        if battle.is_finished() {
            break;
        }
        battle.tick(0.25).unwrap();
        assert_invariants(battle);
        events.extend(battle.drain_events());
    }
    events
}

#[test]
fn skirmish_runs_to_an_outcome() {
    let mut battle = skirmish(42);
    let events = run_collecting(&mut battle);

    assert!(battle.is_finished());
    let ended: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, BattleEvent::BattleEnded { .. }))
        .collect();
    assert_eq!(ended.len(), 1);

    let deaths = events
        .iter()
        .filter(|e| matches!(e, BattleEvent::CombatantDied { .. }))
        .count();
    assert!(deaths >= 2);

    match battle.outcome() {
        Some(BattleOutcome::Win) => assert!(battle.state().roster.is_empty()),
        Some(BattleOutcome::Lose) => assert!(battle.state().roster.heroes().is_empty()),
        None => unreachable!(),
    }
}

#[test]
fn same_seed_replays_the_same_battle() {
    let mut first = skirmish(7);
    let mut second = skirmish(7);
    assert_eq!(run_collecting(&mut first), run_collecting(&mut second));
}

#[test]
fn every_turn_ends_before_the_next_begins() {
    let mut battle = skirmish(3);
    let events = run_collecting(&mut battle);

    let mut open: Option<CombatantId> = None;
    for event in &events {
        match event {
            BattleEvent::TurnStarted { actor, .. } => {
                assert!(open.is_none(), "turn started while {open:?} was acting");
                open = Some(*actor);
            }
            BattleEvent::ActionFinished { actor } => {
                assert_eq!(open, Some(*actor));
                open = None;
            }
            _ => {}
        }
    }
}

#[test]
fn dual_state_activates_doubles_and_expires() {
    let strike = Arc::new(Attack::new("Strike", 5.0).with_charge(10.0));
    let hero = CombatantSpec::new("Monk", CombatStats::new(100.0, 10.0, 0.0, 100.0), vec![strike])
        .with_charge(95.0)
        .with_strategy(SelectionStrategy::RandomAi);
    let dummy = CombatantSpec::new(
        "Dummy",
        CombatStats::new(1000.0, 1.0, 0.0, 10.0),
        vec![Arc::new(Attack::new("Wobble", 0.0))],
    )
    .at(Position::new(6.0, 0.0));
    let mut battle =
        BattleController::new(BattleConfig::default(), vec![hero], vec![dummy]).unwrap();

    let mut events = Vec::new();
    for _ in 0..MAX_TICKS {
        battle.tick(1.0).unwrap();
        events.extend(battle.drain_events());
        let finished = events
            .iter()
            .filter(|e| matches!(e, BattleEvent::ActionFinished { .. }))
            .count();
        if finished == 3 {
            break;
        }
    }

    // The fast monk holds the first three turns.
    let damage: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::ActionResolved { damage, echo: false, .. } => Some(*damage),
            _ => None,
        })
        .collect();
    assert_eq!(damage, vec![15.0, 30.0, 15.0]);

    let activated = events
        .iter()
        .filter(|e| matches!(e, BattleEvent::DualStateActivated { .. }))
        .count();
    assert_eq!(activated, 1);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, BattleEvent::DualStateEnded { combatant } if *combatant == CombatantId(0)))
    );

    let monk = battle.state().combatant(CombatantId(0)).unwrap();
    assert!(!monk.dual_state.active);
    assert_eq!(monk.dual_state.charge, 10.0);
}

#[test]
fn player_controlled_hero_finishes_the_battle() {
    let hero = CombatantSpec::new(
        "Paladin",
        CombatStats::new(200.0, 30.0, 5.0, 60.0),
        vec![Arc::new(Attack::new("Smite", 10.0))],
    );
    let enemies = vec![
        fighter("Imp", CombatStats::new(30.0, 3.0, 0.0, 20.0), Position::new(6.0, 0.0)),
        fighter("Imp", CombatStats::new(30.0, 3.0, 0.0, 20.0), Position::new(6.0, 2.0)),
    ];
    let mut battle = BattleController::new(BattleConfig::default(), vec![hero], enemies).unwrap();

    let mut prompts = 0;
    for _ in 0..MAX_TICKS {
        if battle.is_finished() {
            break;
        }
        battle.tick(0.5).unwrap();
        if let Some(request) = battle.pending_input() {
            prompts += 1;
            let intent = ActionIntent::new(
                request.actor,
                request.targets[0],
                request.attacks[0].clone(),
            );
            battle.submit_intent(intent).unwrap();
        }
    }

    assert_eq!(battle.outcome(), Some(BattleOutcome::Win));
    // 40 damage against 30 HP: one prompt per imp.
    assert_eq!(prompts, 2);
}
