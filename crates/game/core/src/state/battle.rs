//! Mutable match record.
//!
//! The [`Match`] is the single shared resource of the battle engine. All
//! mutation goes through [`crate::combat::resolve_round`] (or a forfeit) and
//! every accepted mutation bumps [`Match::version`] by exactly one.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::combatant::{CombatantSnapshot, Skill};
use super::common::{CreatureId, MatchId, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchStatus {
    InProgress,
    Complete,
}

/// How a completed match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CompletionReason {
    /// A side's HP reached zero.
    Knockout,
    /// The challenger stopped submitting actions.
    Forfeit,
}

/// Per-side mutable combat state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SideState {
    pub hp: u32,
    /// Remaining cooldown rounds per skill name. Absent means ready.
    pub cooldowns: BTreeMap<String, u32>,
}

impl SideState {
    pub fn fresh(snapshot: &CombatantSnapshot) -> Self {
        Self {
            hp: snapshot.stats.max_hp,
            cooldowns: BTreeMap::new(),
        }
    }

    pub fn cooldown(&self, skill: &str) -> u32 {
        self.cooldowns.get(skill).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, skill: &str) -> bool {
        self.cooldown(skill) == 0
    }

    /// End-of-round bookkeeping: tick every cooldown down, then arm the skill
    /// used this round (if any) with its configured cooldown.
    pub fn advance_cooldowns(&mut self, used: Option<&Skill>) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.cooldowns.retain(|_, remaining| *remaining > 0);

        if let Some(skill) = used
            && let Some(rounds) = skill.cooldown
            && rounds > 0
        {
            self.cooldowns.insert(skill.name.clone(), rounds);
        }
    }
}

/// Versioned match record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Match {
    pub id: MatchId,
    pub challenger: CombatantSnapshot,
    pub defender: CombatantSnapshot,
    pub challenger_state: SideState,
    pub defender_state: SideState,
    /// Number of rounds resolved so far.
    pub round: u32,
    pub status: MatchStatus,
    pub winner: Option<CreatureId>,
    pub completion: Option<CompletionReason>,
    /// Side that wins a simultaneous knockout (higher speed, ties to challenger).
    pub first_striker: Side,
    /// Base seed for every roll in this match.
    pub seed: u64,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub last_action_at: DateTime<Utc>,
}

impl Match {
    /// Build a fresh match at version 0 with both sides at full HP.
    pub fn new(
        id: MatchId,
        challenger: CombatantSnapshot,
        defender: CombatantSnapshot,
        seed: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let first_striker = if defender.stats.speed > challenger.stats.speed {
            Side::Defender
        } else {
            Side::Challenger
        };

        Self {
            id,
            challenger_state: SideState::fresh(&challenger),
            defender_state: SideState::fresh(&defender),
            challenger,
            defender,
            round: 0,
            status: MatchStatus::InProgress,
            winner: None,
            completion: None,
            first_striker,
            seed,
            version: 0,
            created_at: now,
            last_action_at: now,
        }
    }

    pub fn snapshot(&self, side: Side) -> &CombatantSnapshot {
        match side {
            Side::Challenger => &self.challenger,
            Side::Defender => &self.defender,
        }
    }

    pub fn side_state(&self, side: Side) -> &SideState {
        match side {
            Side::Challenger => &self.challenger_state,
            Side::Defender => &self.defender_state,
        }
    }

    pub fn side_state_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Challenger => &mut self.challenger_state,
            Side::Defender => &mut self.defender_state,
        }
    }

    pub fn hp(&self, side: Side) -> u32 {
        self.side_state(side).hp
    }

    pub fn is_open(&self) -> bool {
        self.status == MatchStatus::InProgress
    }

    /// Whether this match is between the two creatures, in either direction.
    pub fn involves_pair(&self, a: CreatureId, b: CreatureId) -> bool {
        let (x, y) = (self.challenger.creature, self.defender.creature);
        (x == a && y == b) || (x == b && y == a)
    }

    pub fn involves(&self, creature: CreatureId) -> bool {
        self.challenger.creature == creature || self.defender.creature == creature
    }

    /// Loser creature id, once a winner is set.
    pub fn loser(&self) -> Option<CreatureId> {
        let winner = self.winner?;
        if winner == self.challenger.creature {
            Some(self.defender.creature)
        } else {
            Some(self.challenger.creature)
        }
    }

    /// Active skills on `side` that are off cooldown, in snapshot order.
    pub fn ready_skills(&self, side: Side) -> Vec<&Skill> {
        let state = self.side_state(side);
        self.snapshot(side)
            .active_skills()
            .filter(|skill| state.is_ready(&skill.name))
            .collect()
    }

    /// Mark the match complete with `winner_side` as the sole winner.
    ///
    /// Does nothing if the match is already complete.
    pub fn complete(&mut self, winner_side: Side, reason: CompletionReason) {
        if !self.is_open() {
            return;
        }
        self.status = MatchStatus::Complete;
        self.winner = Some(self.snapshot(winner_side).creature);
        self.completion = Some(reason);
    }

    /// Forfeit by the challenger: the defender wins without another round.
    pub fn forfeit(&mut self, now: DateTime<Utc>) {
        self.complete(Side::Defender, CompletionReason::Forfeit);
        self.version += 1;
        self.last_action_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CreatureProfile, PlayerId, StatBlock, Tier};

    fn snapshot(id: u64, speed: u32) -> CombatantSnapshot {
        CombatantSnapshot::capture(&CreatureProfile {
            id: CreatureId(id),
            owner: PlayerId(id),
            owner_name: format!("owner-{id}"),
            name: format!("pet-{id}"),
            species: String::new(),
            element: String::new(),
            tier: Tier::BASE,
            level: 1,
            stats: StatBlock::new(10, 5, 100, speed, 0),
            skills: vec![Skill::active("Slam", 200, Some(2))],
        })
    }

    #[test]
    fn new_match_starts_full_and_open() {
        let m = Match::new(MatchId(1), snapshot(1, 10), snapshot(2, 20), 42, Utc::now());
        assert_eq!(m.hp(Side::Challenger), 100);
        assert_eq!(m.hp(Side::Defender), 100);
        assert_eq!(m.version, 0);
        assert!(m.is_open());
        assert_eq!(m.first_striker, Side::Defender);
    }

    #[test]
    fn speed_tie_goes_to_challenger() {
        let m = Match::new(MatchId(1), snapshot(1, 20), snapshot(2, 20), 0, Utc::now());
        assert_eq!(m.first_striker, Side::Challenger);
    }

    #[test]
    fn cooldown_blocks_skill_for_configured_rounds() {
        let snap = snapshot(1, 10);
        let slam = snap.skill("Slam").cloned().unwrap();
        let mut state = SideState::fresh(&snap);

        state.advance_cooldowns(Some(&slam));
        assert!(!state.is_ready("Slam"));
        state.advance_cooldowns(None);
        assert!(!state.is_ready("Slam"));
        state.advance_cooldowns(None);
        assert!(state.is_ready("Slam"));
    }

    #[test]
    fn forfeit_awards_defender_once() {
        let mut m = Match::new(MatchId(1), snapshot(1, 10), snapshot(2, 20), 0, Utc::now());
        m.forfeit(Utc::now());
        assert_eq!(m.winner, Some(CreatureId(2)));
        assert_eq!(m.completion, Some(CompletionReason::Forfeit));
        assert_eq!(m.loser(), Some(CreatureId(1)));
        assert_eq!(m.version, 1);
    }
}
