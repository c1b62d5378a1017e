//! Decision procedures for the server-controlled side of a match.
//!
//! Policies are pure: the same match state and seed always yield the same
//! action. Randomness comes from [`RngOracle`] seeded with the match seed and
//! the round being decided.

use crate::action::BattleAction;
use crate::combat::project_damage;
use crate::config::BattleConfig;
use crate::rng::{PcgRng, RngOracle, RollContext, compute_seed};
use crate::state::{Match, Side};

/// Chooses the action for one side of a match.
pub trait OpponentPolicy: Send + Sync {
    /// Pick the action `side` takes in the next round of `battle`.
    ///
    /// Must only return actions that pass [`crate::validate_action`].
    fn choose(&self, battle: &Match, side: Side) -> BattleAction;
}

/// Always performs a basic attack.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicAttackPolicy;

impl OpponentPolicy for BasicAttackPolicy {
    fn choose(&self, _battle: &Match, _side: Side) -> BattleAction {
        BattleAction::Attack
    }
}

/// Finisher-first, otherwise weighted random between skills and attacks.
///
/// 1. If a ready Active skill's no-crit damage knocks the opponent out this
///    round, use the strongest such skill.
/// 2. Otherwise roll a percentile: below `skill_weight_pct` pick one ready
///    skill uniformly, else basic Attack.
/// 3. With no ready skill, Attack.
#[derive(Clone, Debug)]
pub struct WeightedOpponentPolicy<R = PcgRng> {
    config: BattleConfig,
    rng: R,
}

impl WeightedOpponentPolicy<PcgRng> {
    pub fn new(config: BattleConfig) -> Self {
        Self::with_rng(config, PcgRng)
    }
}

impl<R: RngOracle> WeightedOpponentPolicy<R> {
    pub fn with_rng(config: BattleConfig, rng: R) -> Self {
        Self { config, rng }
    }
}

impl<R: RngOracle> OpponentPolicy for WeightedOpponentPolicy<R> {
    fn choose(&self, battle: &Match, side: Side) -> BattleAction {
        let ready = battle.ready_skills(side);
        if ready.is_empty() {
            return BattleAction::Attack;
        }

        let target_hp = battle.hp(side.opponent());
        let finisher = ready
            .iter()
            .map(|skill| {
                let damage = project_damage(battle, side, Some(*skill), false, &self.config);
                (*skill, damage)
            })
            .filter(|(_, damage)| *damage >= target_hp)
            .max_by(|(a, da), (b, db)| da.cmp(db).then_with(|| b.name.cmp(&a.name)));
        if let Some((skill, _)) = finisher {
            return BattleAction::skill(skill.name.clone());
        }

        let round = battle.round + 1;
        let weight_seed = compute_seed(battle.seed, round, side, RollContext::PolicyWeight);
        if self.rng.roll_percent(weight_seed) >= self.config.skill_weight_pct {
            return BattleAction::Attack;
        }

        let pick_seed = compute_seed(battle.seed, round, side, RollContext::PolicyPick);
        let index = self.rng.pick(pick_seed, ready.len());
        BattleAction::skill(ready[index].name.clone())
    }
}
