//! Per-combatant turn state machine.
//!
//! ```text
//!  Idle ──begin_turn──▶ Choosing ──intent──▶ Acting ──back home──▶ Idle
//!    │                                          │
//!    └──────────────── any ──mark_dead──▶ Dead ◀┘
//! ```
//!
//! `Acting` walks through its own phases, one per [`UnitController::step`]
//! at most: echoes fire when the action starts, the actor closes in on its
//! target, waits, strikes, then walks home.
//!
//! Units never reach into the battle controller. They report back through
//! the [`Outbox`] the controller lends them for each step.

use crate::action::{ActionIntent, resolve_action, resolve_echo};
use crate::config::BattleConfig;
use crate::env::{BattleEnv, Dice, RollContext};
use crate::error::BattleError;
use crate::event::BattleEvent;
use crate::state::{BattleState, CombatantId, SelectionStrategy, Team};

/// Progress through one action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActingPhase {
    /// Intent accepted; the action has not started yet.
    Pending,
    /// Closing in on the target.
    Approach,
    /// Standing next to the target before striking.
    Delay { remaining: f32 },
    /// Walking back home after the strike.
    Return,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnitState {
    Idle,
    Choosing,
    Acting(ActingPhase),
    Dead,
}

/// Notifications from a unit to the battle controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitSignal {
    /// The unit is waiting for a player intent.
    InputRequested,
    /// A hit made by this unit (or an echo it triggered) brought `target` to 0 HP.
    Killed(CombatantId),
    /// The unit finished dying and left the roster.
    Died,
    /// The unit is back home and its turn is over.
    ActionFinished,
}

/// Everything a unit emits during one step.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    pub events: Vec<BattleEvent>,
    pub signals: Vec<(CombatantId, UnitSignal)>,
}

impl Outbox {
    pub fn event(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn signal(&mut self, from: CombatantId, signal: UnitSignal) {
        self.signals.push((from, signal));
    }
}

/// Borrowed battle resources for one unit step.
pub struct UnitContext<'a> {
    pub state: &'a mut BattleState,
    pub config: &'a BattleConfig,
    pub env: BattleEnv<'a>,
    pub dice: &'a mut Dice,
    pub outbox: &'a mut Outbox,
}

/// Turn state machine for one combatant.
#[derive(Clone, Debug)]
pub struct UnitController {
    id: CombatantId,
    state: UnitState,
    intent: Option<ActionIntent>,
    action_in_progress: bool,
    input_requested: bool,
}

impl UnitController {
    pub fn new(id: CombatantId) -> Self {
        Self {
            id,
            state: UnitState::Idle,
            intent: None,
            action_in_progress: false,
            input_requested: false,
        }
    }

    pub fn id(&self) -> CombatantId {
        self.id
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn intent(&self) -> Option<&ActionIntent> {
        self.intent.as_ref()
    }

    /// True while the unit holds the turn (choosing or acting).
    pub fn holds_turn(&self) -> bool {
        matches!(self.state, UnitState::Choosing | UnitState::Acting(_))
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.state == UnitState::Choosing && self.input_requested
    }

    /// Hands the turn to this unit.
    ///
    /// A dual-state whose turns are spent ends here, before anything is chosen.
    pub fn begin_turn(&mut self, state: &mut BattleState, outbox: &mut Outbox) {
        if self.state == UnitState::Dead {
            return;
        }
        if let Some(record) = state.combatant_mut(self.id)
            && record.dual_state.expire_if_spent()
        {
            outbox.event(BattleEvent::DualStateEnded {
                combatant: self.id,
            });
        }

        self.intent = None;
        self.input_requested = false;
        self.action_in_progress = false;
        self.state = UnitState::Choosing;
    }

    /// Accepts a player intent while choosing.
    ///
    /// # Errors
    ///
    /// - [`BattleError::NotChoosing`] outside `Choosing`
    /// - [`BattleError::InvalidIntent`] if the actor, attack or target side is wrong
    /// - [`BattleError::UnknownCombatant`] if the target does not exist
    pub fn submit_intent(
        &mut self,
        mut intent: ActionIntent,
        state: &BattleState,
    ) -> Result<(), BattleError> {
        if self.state != UnitState::Choosing {
            return Err(BattleError::NotChoosing { actor: self.id });
        }
        if intent.actor != self.id {
            return Err(BattleError::InvalidIntent {
                actor: self.id,
                reason: "intent belongs to another combatant",
            });
        }

        let actor = state
            .combatant(self.id)
            .ok_or(BattleError::UnknownCombatant(self.id))?;
        let Some(attack) = actor.known_attack(&intent.attack).cloned() else {
            return Err(BattleError::InvalidIntent {
                actor: self.id,
                reason: "attack is not in the combatant's list",
            });
        };
        let target = state
            .combatant(intent.target)
            .ok_or(BattleError::UnknownCombatant(intent.target))?;
        if target.team != actor.team.opponent() {
            return Err(BattleError::InvalidIntent {
                actor: self.id,
                reason: "target is not an opponent",
            });
        }

        intent.attack = attack;
        self.intent = Some(intent);
        self.state = UnitState::Acting(ActingPhase::Pending);
        Ok(())
    }

    /// Starts executing the pending intent and triggers nearby echoes.
    ///
    /// # Errors
    ///
    /// - [`BattleError::ReentrantAction`] if an action is already running;
    ///   the running action is unaffected
    /// - [`BattleError::NotChoosing`] if there is no pending intent
    pub fn start_action(&mut self, ctx: &mut UnitContext<'_>) -> Result<(), BattleError> {
        if self.action_in_progress {
            return Err(BattleError::ReentrantAction { actor: self.id });
        }
        if self.state != UnitState::Acting(ActingPhase::Pending) || self.intent.is_none() {
            return Err(BattleError::NotChoosing { actor: self.id });
        }

        self.action_in_progress = true;
        self.trigger_echoes(ctx);
        self.state = UnitState::Acting(ActingPhase::Approach);
        Ok(())
    }

    /// Advances the unit by `dt` seconds.
    pub fn step(&mut self, ctx: &mut UnitContext<'_>, dt: f32) {
        match self.state {
            UnitState::Idle => {}
            UnitState::Dead => self.die_and_cleanup(ctx),
            UnitState::Choosing => self.choose(ctx),
            UnitState::Acting(phase) => self.act(ctx, phase, dt),
        }
    }

    /// Moves the unit to `Dead` from any state. Cleanup runs on the next step.
    pub fn mark_dead(&mut self) {
        self.state = UnitState::Dead;
        self.intent = None;
        self.action_in_progress = false;
        self.input_requested = false;
    }

    /// Takes the combatant out of the battle. Runs at most once.
    pub fn die_and_cleanup(&mut self, ctx: &mut UnitContext<'_>) {
        self.mark_dead();
        let Some(record) = ctx.state.combatant_mut(self.id) else {
            return;
        };
        if !record.alive {
            return;
        }

        record.alive = false;
        record.dual_state.clear();
        let team = record.team;
        ctx.state.remove_from_battle(self.id);

        ctx.outbox.event(BattleEvent::CombatantDied {
            combatant: self.id,
            team,
        });
        ctx.outbox.signal(self.id, UnitSignal::Died);
    }

    /// Drops back to `Idle` without finishing the current action.
    pub fn cancel(&mut self) {
        if self.state == UnitState::Dead {
            return;
        }
        self.state = UnitState::Idle;
        self.intent = None;
        self.action_in_progress = false;
        self.input_requested = false;
    }

    fn choose(&mut self, ctx: &mut UnitContext<'_>) {
        let Some(record) = ctx.state.combatant(self.id) else {
            return;
        };

        match record.strategy {
            SelectionStrategy::PlayerInput => {
                if !self.input_requested {
                    self.input_requested = true;
                    ctx.outbox
                        .event(BattleEvent::InputRequested { actor: self.id });
                    ctx.outbox.signal(self.id, UnitSignal::InputRequested);
                }
            }
            SelectionStrategy::RandomAi => {
                let targets = living_opponents(ctx.state, record.team);
                if targets.is_empty() {
                    return;
                }
                let attacks = record.attacks.clone();

                let target = targets[ctx.dice.pick(
                    ctx.env.rng,
                    self.id.0,
                    RollContext::Target,
                    targets.len(),
                )];
                let attack = attacks[ctx.dice.pick(
                    ctx.env.rng,
                    self.id.0,
                    RollContext::Attack,
                    attacks.len(),
                )]
                .clone();

                self.intent = Some(ActionIntent::new(self.id, target, attack));
                self.state = UnitState::Acting(ActingPhase::Pending);
            }
        }
    }

    fn act(&mut self, ctx: &mut UnitContext<'_>, phase: ActingPhase, dt: f32) {
        let Some(target) = self.intent.as_ref().map(|intent| intent.target) else {
            // Acting without an intent cannot make progress.
            self.finish(ctx);
            return;
        };

        match phase {
            ActingPhase::Pending => {
                // Reentrant starts are swallowed; the running action continues.
                let _ = self.start_action(ctx);
            }
            ActingPhase::Approach => {
                let Some(goal) = ctx.state.combatant(target).map(|c| c.position) else {
                    self.finish(ctx);
                    return;
                };
                let step = ctx.config.move_speed * dt;
                if let Some(actor) = ctx.state.combatant_mut(self.id) {
                    actor.position = actor.position.move_towards(goal, step);
                    if actor.position.distance(goal) <= ctx.config.approach_distance {
                        self.state = UnitState::Acting(ActingPhase::Delay {
                            remaining: ctx.config.post_arrival_delay,
                        });
                    }
                }
            }
            ActingPhase::Delay { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.state = UnitState::Acting(ActingPhase::Delay { remaining });
                } else {
                    self.strike(ctx);
                    self.state = UnitState::Acting(ActingPhase::Return);
                }
            }
            ActingPhase::Return => {
                let step = ctx.config.move_speed * dt;
                let mut home_reached = false;
                if let Some(actor) = ctx.state.combatant_mut(self.id) {
                    actor.position = actor.position.move_towards(actor.home, step);
                    if actor.position.distance(actor.home) <= ctx.config.return_tolerance {
                        actor.position = actor.home;
                        home_reached = true;
                    }
                }
                if home_reached {
                    self.finish(ctx);
                }
            }
        }
    }

    fn strike(&mut self, ctx: &mut UnitContext<'_>) {
        let Some(intent) = self.intent.clone() else {
            return;
        };

        match resolve_action(ctx.state, &intent, ctx.config) {
            Ok(resolution) => {
                ctx.outbox.event(BattleEvent::ActionResolved {
                    attacker: resolution.attacker,
                    target: resolution.target,
                    attack: resolution.attack,
                    damage: resolution.damage,
                    net_damage: resolution.hit.net_damage,
                    echo: false,
                });
                if let Some(change) = resolution.charge
                    && change.before != change.after
                {
                    ctx.outbox.event(BattleEvent::ChargeChanged {
                        combatant: self.id,
                        before: change.before,
                        after: change.after,
                    });
                }
                if resolution.dual_state_activated {
                    ctx.outbox.event(BattleEvent::DualStateActivated {
                        combatant: self.id,
                        turns: ctx.config.dual_state_turns,
                    });
                }
                if resolution.hit.killed {
                    ctx.outbox
                        .signal(self.id, UnitSignal::Killed(resolution.target));
                }
            }
            Err(err) => {
                ctx.outbox.event(BattleEvent::ActionRejected {
                    actor: self.id,
                    target: intent.target,
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Every living ally in dual-state near the actor repeats its last attack
    /// on a random living opponent.
    fn trigger_echoes(&mut self, ctx: &mut UnitContext<'_>) {
        let Some(team) = ctx.state.combatant(self.id).map(|c| c.team) else {
            return;
        };
        let nearby = ctx
            .env
            .proximity
            .nearby(ctx.state, self.id, ctx.config.echo_radius);

        for echoer in nearby {
            let eligible = ctx
                .state
                .combatant(echoer)
                .is_some_and(|c| c.is_alive() && c.team == team && c.in_dual_state());
            if !eligible {
                continue;
            }

            let targets = living_opponents(ctx.state, team);
            if targets.is_empty() {
                break;
            }
            let target = targets[ctx.dice.pick(
                ctx.env.rng,
                echoer.0,
                RollContext::EchoTarget,
                targets.len(),
            )];

            ctx.outbox.event(BattleEvent::EchoTriggered {
                actor: self.id,
                echoer,
            });
            if let Ok(resolution) = resolve_echo(ctx.state, echoer, target) {
                ctx.outbox.event(BattleEvent::ActionResolved {
                    attacker: echoer,
                    target,
                    attack: resolution.attack,
                    damage: resolution.damage,
                    net_damage: resolution.hit.net_damage,
                    echo: true,
                });
                if resolution.hit.killed {
                    ctx.outbox.signal(echoer, UnitSignal::Killed(target));
                }
            }
        }
    }

    fn finish(&mut self, ctx: &mut UnitContext<'_>) {
        if let Some(actor) = ctx.state.combatant_mut(self.id) {
            actor.initiative -= ctx.config.turn_threshold;
        }
        self.intent = None;
        self.action_in_progress = false;
        self.input_requested = false;
        self.state = UnitState::Idle;

        ctx.outbox
            .event(BattleEvent::ActionFinished { actor: self.id });
        ctx.outbox.signal(self.id, UnitSignal::ActionFinished);
    }
}

/// Opponents of `team` that are alive and standing, in roster order.
pub(crate) fn living_opponents(state: &BattleState, team: Team) -> Vec<CombatantId> {
    state
        .living(team.opponent())
        .filter(|c| c.stats.current_hp > 0.0)
        .map(|c| c.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::Attack;
    use crate::env::{EuclideanProximity, PcgRng};
    use crate::state::{CombatStats, Combatant, CombatantSpec, Position};

    struct Fixture {
        state: BattleState,
        config: BattleConfig,
        dice: Dice,
        outbox: Outbox,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: BattleState::default(),
                config: BattleConfig::default(),
                dice: Dice::new(5),
                outbox: Outbox::default(),
            }
        }

        fn add(&mut self, team: Team, x: f32, hp: f32) -> CombatantId {
            let id = CombatantId(self.state.combatants.len() as u32);
            let spec = CombatantSpec::new(
                format!("unit{}", id.0),
                CombatStats::new(hp, 10.0, 0.0, 10.0),
                vec![Arc::new(Attack::new("Strike", 5.0).with_charge(20.0))],
            )
            .at(Position::new(x, 0.0))
            .with_strategy(SelectionStrategy::RandomAi);
            let record = Combatant::from_spec(id, team, spec, &self.config).unwrap();
            self.state.combatants.push(record);
            self.state.roster.insert(id, team);
            id
        }

        fn run(&mut self, unit: &mut UnitController, dt: f32, steps: usize) {
            let rng = PcgRng;
            let proximity = EuclideanProximity;
            for _ in 0..steps {
                let mut ctx = UnitContext {
                    state: &mut self.state,
                    config: &self.config,
                    env: BattleEnv::new(&rng, &proximity),
                    dice: &mut self.dice,
                    outbox: &mut self.outbox,
                };
                unit.step(&mut ctx, dt);
            }
        }
    }

    #[test]
    fn ai_turn_runs_to_completion() {
        let mut fx = Fixture::new();
        let hero = fx.add(Team::Hero, 0.0, 50.0);
        let enemy = fx.add(Team::Enemy, 10.0, 50.0);
        fx.state.combatants[hero.index()].initiative = 1000.0;

        let mut unit = UnitController::new(hero);
        unit.begin_turn(&mut fx.state, &mut fx.outbox);
        assert_eq!(unit.state(), UnitState::Choosing);

        fx.run(&mut unit, 1.0, 10);

        assert_eq!(unit.state(), UnitState::Idle);
        assert_eq!(fx.state.combatants[enemy.index()].stats.current_hp, 35.0);
        let actor = &fx.state.combatants[hero.index()];
        assert_eq!(actor.position, actor.home);
        assert_eq!(actor.initiative, 0.0);
        assert_eq!(actor.dual_state.charge, 20.0);
        assert!(
            fx.outbox
                .signals
                .contains(&(hero, UnitSignal::ActionFinished))
        );
    }

    #[test]
    fn strike_waits_for_approach_and_delay() {
        let mut fx = Fixture::new();
        let hero = fx.add(Team::Hero, 0.0, 50.0);
        let enemy = fx.add(Team::Enemy, 5.5, 50.0);

        let mut unit = UnitController::new(hero);
        unit.begin_turn(&mut fx.state, &mut fx.outbox);
        // Choose, start, then 0.1 s of walking (2 units at speed 20).
        fx.run(&mut unit, 0.1, 3);
        assert_eq!(unit.state(), UnitState::Acting(ActingPhase::Approach));
        let walked = fx.state.combatants[hero.index()].position;
        assert!((walked.x - 2.0).abs() < 1e-4);

        // Second walking step arrives within 2 units of the target.
        fx.run(&mut unit, 0.1, 1);
        assert!(matches!(
            unit.state(),
            UnitState::Acting(ActingPhase::Delay { .. })
        ));
        assert_eq!(fx.state.combatants[enemy.index()].stats.current_hp, 50.0);

        // The 0.5 s delay elapses, the hit lands and the walk home begins.
        fx.run(&mut unit, 0.1, 6);
        assert_eq!(fx.state.combatants[enemy.index()].stats.current_hp, 35.0);
        assert_eq!(unit.state(), UnitState::Acting(ActingPhase::Return));
    }

    #[test]
    fn reentrant_start_is_rejected() {
        let mut fx = Fixture::new();
        let hero = fx.add(Team::Hero, 0.0, 50.0);
        let enemy = fx.add(Team::Enemy, 10.0, 50.0);
        let attack = fx.state.combatants[hero.index()].attacks[0].clone();

        let mut unit = UnitController::new(hero);
        unit.begin_turn(&mut fx.state, &mut fx.outbox);
        fx.state.combatants[hero.index()].strategy = SelectionStrategy::PlayerInput;
        unit.submit_intent(ActionIntent::new(hero, enemy, attack), &fx.state)
            .unwrap();

        let rng = PcgRng;
        let proximity = EuclideanProximity;
        let mut ctx = UnitContext {
            state: &mut fx.state,
            config: &fx.config,
            env: BattleEnv::new(&rng, &proximity),
            dice: &mut fx.dice,
            outbox: &mut fx.outbox,
        };
        unit.start_action(&mut ctx).unwrap();
        let err = unit.start_action(&mut ctx).unwrap_err();
        assert_eq!(err, BattleError::ReentrantAction { actor: hero });
        assert_eq!(unit.state(), UnitState::Acting(ActingPhase::Approach));
    }

    #[test]
    fn altered_copy_of_known_attack_is_rejected() {
        let mut fx = Fixture::new();
        let hero = fx.add(Team::Hero, 0.0, 50.0);
        let enemy = fx.add(Team::Enemy, 10.0, 50.0);
        fx.state.combatants[hero.index()].strategy = SelectionStrategy::PlayerInput;

        let mut unit = UnitController::new(hero);
        unit.begin_turn(&mut fx.state, &mut fx.outbox);

        let inflated = Arc::new(Attack::new("Strike", 9999.0).with_charge(100.0));
        let err = unit
            .submit_intent(ActionIntent::new(hero, enemy, inflated), &fx.state)
            .unwrap_err();
        assert!(matches!(err, BattleError::InvalidIntent { .. }));
        assert_eq!(unit.state(), UnitState::Choosing);

        // An equal copy is accepted, but the unit keeps its own attack.
        let copy = Arc::new(Attack::new("Strike", 5.0).with_charge(20.0));
        unit.submit_intent(ActionIntent::new(hero, enemy, copy.clone()), &fx.state)
            .unwrap();
        let own = &fx.state.combatants[hero.index()].attacks[0];
        let stored = &unit.intent().unwrap().attack;
        assert!(Arc::ptr_eq(stored, own));
        assert!(!Arc::ptr_eq(stored, &copy));
    }

    #[test]
    fn dead_target_ends_turn_without_effects() {
        let mut fx = Fixture::new();
        let hero = fx.add(Team::Hero, 0.0, 50.0);
        let enemy = fx.add(Team::Enemy, 3.0, 50.0);
        fx.state.combatants[hero.index()].initiative = 1000.0;

        let mut unit = UnitController::new(hero);
        unit.begin_turn(&mut fx.state, &mut fx.outbox);
        // Choose and start, then the target dies before the strike.
        fx.run(&mut unit, 1.0, 2);
        fx.state.combatants[enemy.index()].alive = false;
        fx.run(&mut unit, 1.0, 10);

        assert_eq!(unit.state(), UnitState::Idle);
        let actor = &fx.state.combatants[hero.index()];
        assert_eq!(actor.dual_state.charge, 0.0);
        assert_eq!(actor.initiative, 0.0);
        assert!(
            fx.outbox
                .events
                .iter()
                .any(|e| matches!(e, BattleEvent::ActionRejected { .. }))
        );
    }

    #[test]
    fn death_cleanup_runs_once() {
        let mut fx = Fixture::new();
        let _hero = fx.add(Team::Hero, 0.0, 50.0);
        let enemy = fx.add(Team::Enemy, 3.0, 50.0);
        fx.state.combatants[enemy.index()].dual_state.charge = 60.0;

        let mut unit = UnitController::new(enemy);
        unit.mark_dead();
        fx.run(&mut unit, 0.0, 3);

        assert_eq!(unit.state(), UnitState::Dead);
        assert!(!fx.state.roster.contains(enemy));
        assert_eq!(fx.state.combatants[enemy.index()].dual_state.charge, 0.0);
        let died = fx
            .outbox
            .signals
            .iter()
            .filter(|(_, s)| *s == UnitSignal::Died)
            .count();
        assert_eq!(died, 1);
    }

    #[test]
    fn nearby_ally_in_dual_state_echoes() {
        let mut fx = Fixture::new();
        let hero = fx.add(Team::Hero, 0.0, 50.0);
        let ally = fx.add(Team::Hero, 1.0, 50.0);
        let far_ally = fx.add(Team::Hero, 9.0, 50.0);
        let enemy = fx.add(Team::Enemy, 5.0, 100.0);
        for id in [ally, far_ally] {
            let record = &mut fx.state.combatants[id.index()];
            record.dual_state.charge = 100.0;
            record.dual_state.try_activate(100.0, 1);
        }

        let mut unit = UnitController::new(hero);
        unit.begin_turn(&mut fx.state, &mut fx.outbox);
        fx.run(&mut unit, 1.0, 2);

        let echoes: Vec<_> = fx
            .outbox
            .events
            .iter()
            .filter_map(|e| match e {
                BattleEvent::EchoTriggered { echoer, .. } => Some(*echoer),
                _ => None,
            })
            .collect();
        assert_eq!(echoes, vec![ally]);
        // Echo: (ATK 10 + Strike 5) doubled, before the actor's own strike.
        assert_eq!(fx.state.combatants[enemy.index()].stats.current_hp, 70.0);
        assert_eq!(fx.state.combatants[ally.index()].dual_state.turns_remaining, 1);
    }

    #[test]
    fn spent_dual_state_expires_at_turn_start() {
        let mut fx = Fixture::new();
        let hero = fx.add(Team::Hero, 0.0, 50.0);
        let record = &mut fx.state.combatants[hero.index()];
        record.dual_state.charge = 100.0;
        record.dual_state.try_activate(100.0, 1);
        record.dual_state.record_completed_action(false);

        let mut unit = UnitController::new(hero);
        unit.begin_turn(&mut fx.state, &mut fx.outbox);

        let record = &fx.state.combatants[hero.index()];
        assert!(!record.dual_state.active);
        assert_eq!(record.dual_state.charge, 0.0);
        assert_eq!(
            fx.outbox.events,
            vec![BattleEvent::DualStateEnded { combatant: hero }]
        );
    }
}
