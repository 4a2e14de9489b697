//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive a battle.

use std::time::Duration;

use battle_core::{BattleConfig, BattleController, BattleOutcome, CombatantSpec, Team};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::{ActionProvider, ProviderKind, Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{Command, SimulationWorker, TickReport};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Simulated time per frame.
    pub frame_interval: Duration,
    /// Sleep for `frame_interval` between frames instead of running flat out.
    pub realtime: bool,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Battle seed; drawn at random when unset.
    pub seed: Option<u64>,
    /// Upper bound on frames for [`Runtime::run`].
    pub max_frames: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            frame_interval: Duration::from_millis(16),
            realtime: false,
            event_buffer_size: 256,
            command_buffer_size: 32,
            seed: None,
            max_frames: None,
        }
    }
}

/// Main runtime that orchestrates a battle
///
/// Design: Runtime owns the worker and coordinates execution.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    // Shared handle (can be cloned for clients)
    handle: RuntimeHandle,

    // Intent providers for player-controlled combatants, per side
    hero_provider: Option<Box<dyn ActionProvider>>,
    enemy_provider: Option<Box<dyn ActionProvider>>,

    config: RuntimeConfig,
    seed: u64,
    frames: u64,

    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Seed the battle was started with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Frames stepped so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Execute a single frame.
    ///
    /// If a player-controlled combatant is waiting afterwards, asks the
    /// provider for its side and submits the answer. A rejected intent is
    /// logged; the combatant stays waiting and is prompted again next frame.
    pub async fn step(&mut self) -> Result<TickReport> {
        let dt = self.config.frame_interval.as_secs_f32();
        let report = self.handle.tick(dt).await?;
        self.frames += 1;

        if let Some(prompt) = &report.prompt {
            let kind = ProviderKind::from(prompt.team);
            let provider = match prompt.team {
                Team::Hero => self.hero_provider.as_ref(),
                Team::Enemy => self.enemy_provider.as_ref(),
            }
            .ok_or(RuntimeError::ProviderNotSet { kind })?;

            let intent = provider.provide_intent(prompt).await?;
            match self.handle.submit_intent(intent).await {
                Ok(()) => {}
                Err(RuntimeError::Battle(error)) => {
                    warn!(
                        target: "runtime",
                        provider = %kind,
                        error = %error,
                        "Provider intent rejected; prompting again"
                    );
                }
                Err(other) => return Err(other),
            }
        }

        Ok(report)
    }

    /// Run frames until the battle is decided.
    pub async fn run(&mut self) -> Result<BattleOutcome> {
        loop {
            if let Some(limit) = self.config.max_frames
                && self.frames >= limit
            {
                return Err(RuntimeError::FrameLimitReached {
                    frames: self.frames,
                });
            }

            let report = self.step().await?;
            if let Some(outcome) = report.outcome {
                info!(target: "runtime", %outcome, frames = self.frames, "Battle finished");
                return Ok(outcome);
            }

            if self.config.realtime {
                tokio::time::sleep(self.config.frame_interval).await;
            }
        }
    }

    /// Set the hero-side intent provider
    pub fn set_hero_provider(&mut self, provider: impl ActionProvider + 'static) {
        self.hero_provider = Some(Box::new(provider));
    }

    /// Set the enemy-side intent provider
    pub fn set_enemy_provider(&mut self, provider: impl ActionProvider + 'static) {
        self.enemy_provider = Some(Box::new(provider));
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    roster: Option<(Vec<CombatantSpec>, Vec<CombatantSpec>)>,
    hero_provider: Option<Box<dyn ActionProvider>>,
    enemy_provider: Option<Box<dyn ActionProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            roster: None,
            hero_provider: None,
            enemy_provider: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the combatants of both sides (required)
    pub fn roster(mut self, heroes: Vec<CombatantSpec>, enemies: Vec<CombatantSpec>) -> Self {
        self.roster = Some((heroes, enemies));
        self
    }

    /// Fix the battle seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set hero-side intent provider (optional)
    pub fn hero_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.hero_provider = Some(Box::new(provider));
        self
    }

    /// Set enemy-side intent provider (optional)
    pub fn enemy_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.enemy_provider = Some(Box::new(provider));
        self
    }

    /// Build the runtime and start the simulation worker
    pub async fn build(self) -> Result<Runtime> {
        let (heroes, enemies) = self.roster.ok_or(RuntimeError::MissingRoster)?;
        let seed = self.config.seed.unwrap_or_else(rand::random);

        let battle = BattleController::new(self.config.battle.clone(), heroes, enemies)?
            .with_seed(seed);
        info!(
            target: "runtime",
            seed,
            heroes = battle.state().roster.heroes().len(),
            enemies = battle.state().roster.enemies().len(),
            "Battle runtime starting"
        );

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(battle, command_rx, event_bus);
        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            hero_provider: self.hero_provider,
            enemy_provider: self.enemy_provider,
            config: self.config,
            seed,
            frames: 0,
            sim_worker_handle,
        })
    }
}
