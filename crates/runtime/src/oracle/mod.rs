//! Read-only creature catalog consulted when a match starts.
//!
//! The catalog answers "what does this creature look like right now". The
//! battle service captures a [`arena_core::CombatantSnapshot`] from it once per
//! match, so later catalog edits never reach a running battle.
mod roster;

use arena_core::{CreatureId, CreatureProfile, PlayerId};
use async_trait::async_trait;
use thiserror::Error;

pub use roster::{InMemoryRoster, RosterFile};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to read roster file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse roster file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("creature catalog unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, OracleError>;

/// Source of live creature profiles.
#[async_trait]
pub trait CreatureOracle: Send + Sync {
    /// Current profile of `id`, or `None` if it does not exist.
    async fn creature(&self, id: CreatureId) -> Result<Option<CreatureProfile>>;

    /// Creatures owned by `owner`, ordered by creature id.
    async fn creatures_owned_by(&self, owner: PlayerId) -> Result<Vec<CreatureProfile>>;

    /// Every creature in the catalog, ordered by creature id.
    async fn all_creatures(&self) -> Result<Vec<CreatureProfile>>;
}
