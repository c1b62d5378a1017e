//! Read models returned by the battle service.

use arena_core::{CreatureId, MatchId, PlayerId, RatingChange, RoundOutcome, Tier};
use serde::Serialize;

/// Input of [`super::BattleService::submit_action`].
#[derive(Clone, Debug)]
pub struct SubmitAction {
    pub player: PlayerId,
    pub match_id: MatchId,
    /// Version the client last saw. `None` accepts whatever is stored.
    pub expected_version: Option<u64>,
    pub action: arena_core::BattleAction,
}

/// Result of one accepted round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    pub match_id: MatchId,
    pub challenger: CreatureId,
    pub outcome: RoundOutcome,
    pub version: u64,
    pub winner: Option<CreatureId>,
    pub rating_change: Option<RatingChange>,
}

impl RoundReport {
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Rating movement seen by the challenger, if the match ended.
    pub fn challenger_rating_delta(&self) -> Option<i64> {
        self.rating_change
            .map(|change| change.signed_for(self.challenger))
    }
}

/// A creature the player may challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentEntry {
    pub creature: CreatureId,
    pub name: String,
    pub species: String,
    pub element: String,
    pub tier: Tier,
    pub level: u32,
    pub owner: PlayerId,
    pub owner_name: String,
    pub rating: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub creature: CreatureId,
    pub name: String,
    pub level: u32,
    pub owner: PlayerId,
    pub owner_name: String,
    pub rating: u32,
    pub wins: u32,
    pub losses: u32,
}
