//! Records exchanged with repositories.

use arena_core::{CombatantSnapshot, CompletionReason, CreatureId, EloRating, Match, MatchId, PlayerId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Rating rules to apply when a commit completes a match.
#[derive(Clone, Copy, Debug)]
pub struct Settlement {
    pub updater: EloRating,
    /// Rating for creatures with no record yet.
    pub initial_rating: u32,
}

/// Compare-and-swap write of a match.
#[derive(Clone, Debug)]
pub struct MatchCommit {
    /// Version the caller read before resolving.
    pub expected_version: u64,
    /// New state; its version must be `expected_version + 1`.
    pub next: Match,
    pub settlement: Settlement,
}

/// One side of a finished match as recorded in history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParticipant {
    pub creature: CreatureId,
    pub name: String,
    pub owner: PlayerId,
}

impl From<&CombatantSnapshot> for HistoryParticipant {
    fn from(snapshot: &CombatantSnapshot) -> Self {
        Self {
            creature: snapshot.creature,
            name: snapshot.name.clone(),
            owner: snapshot.owner,
        }
    }
}

/// Immutable record written once when a match completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchHistoryEntry {
    pub match_id: MatchId,
    pub challenger: HistoryParticipant,
    pub defender: HistoryParticipant,
    pub winner: CreatureId,
    pub rounds: u32,
    /// Rating points moved from loser to winner.
    pub rating_delta: u32,
    pub reason: CompletionReason,
    pub completed_at: DateTime<Utc>,
}

impl MatchHistoryEntry {
    pub fn involves(&self, creature: CreatureId) -> bool {
        self.challenger.creature == creature || self.defender.creature == creature
    }
}
