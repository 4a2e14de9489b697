//! Runner configuration read from the process environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Roster bundled with the content crate.
pub const DEFAULT_ROSTER: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../battle/content/data/roster.ron"
);

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub roster: PathBuf,
    /// Battle tuning; built-in defaults when unset.
    pub battle_config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub frame_interval: Duration,
    /// Sleep between frames so movement plays out at wall-clock speed.
    pub realtime: bool,
    /// Let a random provider play the heroes instead of prompting on stdin.
    pub auto: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            roster: PathBuf::from(DEFAULT_ROSTER),
            battle_config: None,
            seed: None,
            frame_interval: Duration::from_millis(16),
            realtime: false,
            auto: false,
            log_dir: None,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_ROSTER` - RON roster file (default: bundled roster)
    /// - `BATTLE_CONFIG` - TOML battle tuning file (default: none)
    /// - `BATTLE_SEED` - Battle seed (default: random)
    /// - `BATTLE_FRAME_MS` - Simulated milliseconds per frame (default: 16)
    /// - `BATTLE_REALTIME` - Sleep between frames (default: false)
    /// - `BATTLE_AUTO` - Random hero decisions instead of stdin (default: false)
    /// - `BATTLE_LOG_DIR` - Also write logs to `<dir>/battle.log` (default: none)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = read_env_path("BATTLE_ROSTER") {
            config.roster = path;
        }
        config.battle_config = read_env_path("BATTLE_CONFIG");
        config.seed = read_env::<u64>("BATTLE_SEED");

        if let Some(millis) = read_env::<u64>("BATTLE_FRAME_MS") {
            config.frame_interval = Duration::from_millis(millis.max(1));
        }
        if let Some(realtime) = read_env_bool("BATTLE_REALTIME") {
            config.realtime = realtime;
        }
        if let Some(auto) = read_env_bool("BATTLE_AUTO") {
            config.auto = auto;
        }
        config.log_dir = read_env_path("BATTLE_LOG_DIR");

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn read_env_path(key: &str) -> Option<PathBuf> {
    let value = env::var(key).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}
