use std::path::PathBuf;
use std::sync::Arc;

use battle_content::RosterLoader;
use battle_core::{
    ActionIntent, Attack, BattleEvent, BattleOutcome, CombatStats, CombatantId, CombatantSpec,
    Position, SelectionStrategy,
};
use runtime::{
    ChannelActionProvider, FirstAttackProvider, ProviderKind, RandomActionProvider, Runtime,
    RuntimeConfig, RuntimeError, Topic,
};

fn ai(name: &str, stats: CombatStats, x: f32) -> CombatantSpec {
    CombatantSpec::new(name, stats, vec![Arc::new(Attack::new("Strike", 5.0))])
        .at(Position::new(x, 0.0))
        .with_strategy(SelectionStrategy::RandomAi)
}

fn player(name: &str, stats: CombatStats) -> CombatantSpec {
    CombatantSpec::new(name, stats, vec![Arc::new(Attack::new("Strike", 5.0))])
        .with_strategy(SelectionStrategy::PlayerInput)
}

fn capped(frames: u64) -> RuntimeConfig {
    RuntimeConfig {
        max_frames: Some(frames),
        ..RuntimeConfig::default()
    }
}

#[tokio::test]
async fn ai_battle_runs_to_outcome_and_publishes_lifecycle() {
    let mut runtime = Runtime::builder()
        .config(capped(20_000))
        .roster(
            vec![ai("Champion", CombatStats::new(100.0, 40.0, 0.0, 60.0), 0.0)],
            vec![
                ai("Rat", CombatStats::new(20.0, 1.0, 0.0, 20.0), 6.0),
                ai("Rat", CombatStats::new(20.0, 1.0, 0.0, 20.0), 7.0),
            ],
        )
        .seed(1)
        .build()
        .await
        .unwrap();
    let mut lifecycle = runtime.handle().subscribe(Topic::Lifecycle);

    let outcome = runtime.run().await.unwrap();
    assert_eq!(outcome, BattleOutcome::Win);

    let started = lifecycle.recv().await.unwrap();
    assert!(matches!(started.payload, BattleEvent::BattleStarted { .. }));
    let ended = lifecycle.recv().await.unwrap();
    assert_eq!(
        ended.payload,
        BattleEvent::BattleEnded {
            outcome: BattleOutcome::Win
        }
    );

    let snapshot = runtime.handle().query_state().await.unwrap();
    assert_eq!(snapshot.outcome, Some(BattleOutcome::Win));
    assert!(snapshot.state.roster.is_empty());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn player_side_uses_registered_provider() {
    let mut runtime = Runtime::builder()
        .config(capped(20_000))
        .roster(
            vec![player("Paladin", CombatStats::new(200.0, 30.0, 5.0, 60.0))],
            vec![ai("Imp", CombatStats::new(30.0, 3.0, 0.0, 20.0), 6.0)],
        )
        .hero_provider(FirstAttackProvider)
        .build()
        .await
        .unwrap();

    assert_eq!(runtime.run().await.unwrap(), BattleOutcome::Win);
}

#[tokio::test]
async fn missing_provider_is_reported() {
    let mut runtime = Runtime::builder()
        .roster(
            vec![player("Paladin", CombatStats::new(200.0, 30.0, 5.0, 60.0))],
            vec![ai("Imp", CombatStats::new(30.0, 3.0, 0.0, 20.0), 6.0)],
        )
        .build()
        .await
        .unwrap();

    let err = runtime.step().await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ProviderNotSet {
            kind: ProviderKind::Hero
        }
    ));
}

#[tokio::test]
async fn channel_provider_lets_another_task_decide() {
    let (provider, mut prompts) = ChannelActionProvider::channel(4);
    let answered = tokio::spawn(async move {
        let mut count = 0;
        while let Some((prompt, reply)) = prompts.recv().await {
            count += 1;
            let request = prompt.request;
            let _ = reply.send(ActionIntent::new(
                request.actor,
                request.targets[0],
                request.attacks[0].clone(),
            ));
        }
        count
    });

    let mut runtime = Runtime::builder()
        .config(capped(20_000))
        .roster(
            vec![player("Paladin", CombatStats::new(200.0, 30.0, 5.0, 60.0))],
            vec![
                ai("Imp", CombatStats::new(30.0, 3.0, 0.0, 20.0), 6.0),
                ai("Imp", CombatStats::new(30.0, 3.0, 0.0, 20.0), 7.0),
            ],
        )
        .hero_provider(provider)
        .build()
        .await
        .unwrap();

    assert_eq!(runtime.run().await.unwrap(), BattleOutcome::Win);
    drop(runtime);
    assert_eq!(answered.await.unwrap(), 2);
}

#[tokio::test]
async fn rejected_intent_prompts_again() {
    let (provider, mut prompts) = ChannelActionProvider::channel(4);
    tokio::spawn(async move {
        let mut first = true;
        while let Some((prompt, reply)) = prompts.recv().await {
            let request = prompt.request;
            // First answer targets the hero itself, which the battle refuses.
            let target = if first { request.actor } else { request.targets[0] };
            first = false;
            let _ = reply.send(ActionIntent::new(request.actor, target, request.attacks[0].clone()));
        }
    });

    let mut runtime = Runtime::builder()
        .roster(
            vec![player("Paladin", CombatStats::new(200.0, 30.0, 5.0, 60.0))],
            vec![ai("Imp", CombatStats::new(30.0, 3.0, 0.0, 20.0), 6.0)],
        )
        .hero_provider(provider)
        .build()
        .await
        .unwrap();

    let first = runtime.step().await.unwrap();
    assert!(first.prompt.is_some());
    let second = runtime.step().await.unwrap();
    assert!(second.prompt.is_some());

    let snapshot = runtime.handle().query_state().await.unwrap();
    assert_eq!(snapshot.current_actor, Some(CombatantId(0)));
}

#[tokio::test]
async fn frame_limit_stops_a_long_battle() {
    let mut runtime = Runtime::builder()
        .config(capped(5))
        .roster(
            vec![ai("Knight", CombatStats::new(500.0, 5.0, 0.0, 30.0), 0.0)],
            vec![ai("Golem", CombatStats::new(500.0, 5.0, 0.0, 30.0), 6.0)],
        )
        .hero_provider(RandomActionProvider::new(3))
        .build()
        .await
        .unwrap();

    let err = runtime.run().await.unwrap_err();
    assert!(matches!(err, RuntimeError::FrameLimitReached { frames: 5 }));
}

#[tokio::test]
async fn building_without_roster_fails() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingRoster)));
}

#[tokio::test]
async fn bundled_roster_battle_finishes() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../battle/content/data/roster.ron");
    let roster = RosterLoader::load(&path).unwrap();

    let mut runtime = Runtime::builder()
        .config(capped(200_000))
        .roster(roster.heroes, roster.enemies)
        .hero_provider(RandomActionProvider::new(11))
        .seed(11)
        .build()
        .await
        .unwrap();

    let outcome = runtime.run().await.unwrap();
    let snapshot = runtime.handle().query_state().await.unwrap();
    assert_eq!(snapshot.outcome, Some(outcome));
}
