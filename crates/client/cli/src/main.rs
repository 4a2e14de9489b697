//! Headless terminal battle runner.
mod config;
mod narrator;
mod prompt;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::{ConfigLoader, RosterLoader};
use battle_core::{BattleConfig, BattleOutcome};
use runtime::{RandomActionProvider, Runtime, RuntimeConfig};
use tokio::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::CliConfig;
use narrator::Narrator;
use prompt::StdinActionProvider;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let _guard = setup_logging(config.log_dir.as_deref())?;

    let outcome = run_battle(&config).await?;
    tracing::info!(%outcome, "Session over");
    Ok(())
}

async fn run_battle(config: &CliConfig) -> Result<BattleOutcome> {
    let roster = RosterLoader::load(&config.roster)?;
    let battle = match &config.battle_config {
        Some(path) => ConfigLoader::load(path)?,
        None => BattleConfig::default(),
    };

    let runtime_config = RuntimeConfig {
        battle,
        frame_interval: config.frame_interval,
        realtime: config.realtime,
        seed: config.seed,
        ..RuntimeConfig::default()
    };
    let mut runtime = Runtime::builder()
        .config(runtime_config)
        .roster(roster.heroes, roster.enemies)
        .build()
        .await
        .context("failed to start battle")?;
    tracing::info!(seed = runtime.seed(), roster = %config.roster.display(), "Battle loaded");

    let handle = runtime.handle();
    let snapshot = handle.query_state().await?;
    let narrator = Arc::new(Mutex::new(Narrator::new(&handle, &snapshot.state)));

    // Both sides get a provider so rosters that hand enemies to a player still run.
    let seed = runtime.seed();
    if config.auto {
        runtime.set_hero_provider(RandomActionProvider::new(seed));
    } else {
        runtime.set_hero_provider(StdinActionProvider::new(Arc::clone(&narrator)));
    }
    runtime.set_enemy_provider(RandomActionProvider::new(seed.rotate_left(32)));

    let outcome = loop {
        let report = runtime.step().await?;
        narrator.lock().await.flush();

        if let Some(outcome) = report.outcome {
            break outcome;
        }
        if config.realtime {
            tokio::time::sleep(config.frame_interval).await;
        }
    };

    println!("seed {seed}, {} frames", runtime.frames());
    runtime.shutdown().await?;
    Ok(outcome)
}

/// Logs go to stderr, and also to `<log_dir>/battle.log` when a directory is given.
///
/// The returned guard flushes the file writer on drop.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, "battle.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/battle.log", dir.display());
    }

    Ok(guard)
}
