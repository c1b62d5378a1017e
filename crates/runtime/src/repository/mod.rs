//! Repository layer for mutable battle data.
//!
//! Repositories hold data that CHANGES during play:
//! - Match records (versioned, compare-and-swap writes)
//! - Per-creature ratings
//! - The append-only match history
//!
//! Static creature data is served by the roster oracle, not by repositories.

mod error;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use memory::InMemoryArenaStore;
pub use traits::{ArenaRepository, HistoryRepository, MatchRepository, RatingRepository};
pub use types::{HistoryParticipant, MatchCommit, MatchHistoryEntry, Settlement};
