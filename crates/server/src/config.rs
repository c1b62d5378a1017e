//! Server configuration structures and loaders.
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use arena_core::BattleConfig;
use arena_runtime::RuntimeConfig;

/// Configuration required to bootstrap the arena server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// RON roster seeding the creature catalog.
    pub roster_path: PathBuf,
    /// Directory for the rolling log file; stdout only when unset.
    pub log_dir: Option<PathBuf>,
    pub runtime: RuntimeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            roster_path: PathBuf::from("crates/server/data/roster.ron"),
            log_dir: None,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_BIND_ADDR` - Listen address (default: 127.0.0.1:8080)
    /// - `ARENA_ROSTER_PATH` - Creature roster file (default: crates/server/data/roster.ron)
    /// - `ARENA_INACTIVITY_SECS` - Idle seconds before a match is forfeited (default: 300)
    /// - `ARENA_SWEEP_SECS` - Seconds between inactivity sweeps (default: 30)
    /// - `ARENA_K_FACTOR` - Elo K-factor (default: 32)
    /// - `ARENA_LOG_DIR` - Directory for `arena.log` (default: none)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(addr) = read_env::<SocketAddr>("ARENA_BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Ok(path) = env::var("ARENA_ROSTER_PATH") {
            config.roster_path = PathBuf::from(path);
        }

        if let Some(secs) = read_env::<u64>("ARENA_INACTIVITY_SECS") {
            config.runtime.inactivity_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = read_env::<u64>("ARENA_SWEEP_SECS") {
            config.runtime.sweep_interval = Duration::from_secs(secs.max(1));
        }

        if let Some(k) = read_env::<u32>("ARENA_K_FACTOR") {
            config.runtime.battle = BattleConfig::new().with_k_factor(k);
        }

        config.log_dir = env::var("ARENA_LOG_DIR").ok().map(PathBuf::from);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
