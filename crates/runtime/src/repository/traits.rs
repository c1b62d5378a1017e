//! Repository contracts for match state, ratings, and match history.

use arena_core::{CreatureId, Match, MatchId, RatingChange, RatingRecord};
use chrono::{DateTime, Utc};

use super::error::Result;
use super::types::{MatchCommit, MatchHistoryEntry};

/// Versioned storage of match records.
///
/// Implementations must make [`MatchRepository::commit`] atomic: the match
/// write, both rating updates and the history append either all happen or
/// none do.
pub trait MatchRepository: Send + Sync {
    /// Allocate a fresh, never reused match identifier.
    fn next_match_id(&self) -> Result<MatchId>;

    /// Store a new match.
    ///
    /// Fails with `DuplicateOpenMatch` when an in-progress match between the
    /// same two creatures (either direction) already exists. The check and
    /// the insert happen under one lock.
    fn insert(&self, battle: &Match) -> Result<()>;

    /// Load a match by id.
    fn load(&self, id: MatchId) -> Result<Option<Match>>;

    /// Replace a match if its stored version equals `commit.expected_version`.
    ///
    /// When the new state is complete and a settlement is attached, the
    /// rating update and history entry are applied in the same transaction.
    /// Returns the rating change, if any.
    fn commit(&self, commit: MatchCommit) -> Result<Option<RatingChange>>;

    /// Ids of in-progress matches whose last action is at or before `cutoff`.
    fn idle_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<MatchId>>;
}

/// Read access to per-creature ratings.
///
/// Writes only happen through [`MatchRepository::commit`].
pub trait RatingRepository: Send + Sync {
    /// All creatures that have a rating record, by creature id.
    fn ratings(&self) -> Result<Vec<RatingRecord>>;
}

/// Append-only log of completed matches.
///
/// Appends only happen through [`MatchRepository::commit`].
pub trait HistoryRepository: Send + Sync {
    /// Entries involving any of `creatures`, newest first.
    fn history_for(&self, creatures: &[CreatureId]) -> Result<Vec<MatchHistoryEntry>>;

    /// Total number of entries.
    fn history_len(&self) -> Result<usize>;
}

/// Everything the battle service needs from storage.
pub trait ArenaRepository: MatchRepository + RatingRepository + HistoryRepository {}

impl<T> ArenaRepository for T where T: MatchRepository + RatingRepository + HistoryRepository {}
