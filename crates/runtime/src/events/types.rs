//! Event payloads for each topic.

use arena_core::{CompletionReason, CreatureId, MatchId, RatingChange, RoundOutcome};
use serde::{Deserialize, Serialize};

/// Match lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A challenge was accepted and the match stored at version 0.
    Started {
        match_id: MatchId,
        challenger: CreatureId,
        defender: CreatureId,
    },

    /// One round was resolved and committed.
    RoundResolved {
        match_id: MatchId,
        outcome: RoundOutcome,
        version: u64,
    },

    /// The match reached `Complete`.
    Completed {
        match_id: MatchId,
        winner: CreatureId,
        reason: CompletionReason,
        rounds: u32,
    },
}

impl MatchEvent {
    pub fn match_id(&self) -> MatchId {
        match self {
            Self::Started { match_id, .. }
            | Self::RoundResolved { match_id, .. }
            | Self::Completed { match_id, .. } => *match_id,
        }
    }
}

/// Rating movements applied at match completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEvent {
    pub match_id: MatchId,
    pub change: RatingChange,
}
