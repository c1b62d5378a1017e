//! Error types raised by repository implementations.

use arena_core::{MatchId, Match};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    #[error("match {0} already exists")]
    MatchExists(MatchId),

    #[error("an open match already exists between the two creatures")]
    DuplicateOpenMatch,

    #[error("version conflict on match {id}: expected {expected}, stored {found}")]
    VersionConflict { id: MatchId, expected: u64, found: u64 },

    #[error("match {0} is already complete")]
    AlreadyComplete(MatchId),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub(crate) fn version_conflict(stored: &Match, expected: u64) -> Self {
        Self::VersionConflict {
            id: stored.id,
            expected,
            found: stored.version,
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
