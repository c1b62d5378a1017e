//! Round resolution.
//!
//! Both sides act every round. Each side's damage is computed from the state
//! at the start of the round and both reductions are applied together, so the
//! order in which the two actions are evaluated never changes the outcome.

use chrono::{DateTime, Utc};

use crate::action::BattleAction;
use crate::config::BattleConfig;
use crate::error::ActionError;
use crate::rng::RoundRolls;
use crate::state::{CompletionReason, Match, Side, Skill, SkillKind};

use super::damage::{BASIC_ATTACK_POWER, apply_damage, calculate_damage, is_critical};

/// What one side did in a round.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub action: BattleAction,
    pub damage: u32,
    pub critical: bool,
}

/// Result of resolving one round.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RoundOutcome {
    /// Round number that was resolved (1-based).
    pub round: u32,
    pub challenger: ActionOutcome,
    pub defender: ActionOutcome,
    pub challenger_hp: u32,
    pub defender_hp: u32,
    /// Set when the round ended the match.
    pub winner: Option<Side>,
}

impl RoundOutcome {
    pub fn outcome(&self, side: Side) -> &ActionOutcome {
        match side {
            Side::Challenger => &self.challenger,
            Side::Defender => &self.defender,
        }
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }
}

/// Check that `side` may take `action` this round.
///
/// Returns the skill being used, or `None` for a basic attack.
pub fn validate_action<'m>(
    battle: &'m Match,
    side: Side,
    action: &BattleAction,
) -> Result<Option<&'m Skill>, ActionError> {
    if !battle.is_open() {
        return Err(ActionError::MatchComplete);
    }

    let BattleAction::Skill(name) = action else {
        return Ok(None);
    };

    let skill = battle
        .snapshot(side)
        .skill(name)
        .ok_or_else(|| ActionError::UnknownSkill { name: name.clone() })?;

    if let SkillKind::Passive(_) = skill.kind {
        return Err(ActionError::PassiveSkill { name: name.clone() });
    }

    let remaining = battle.side_state(side).cooldown(name);
    if remaining > 0 {
        return Err(ActionError::SkillOnCooldown {
            name: name.clone(),
            remaining,
        });
    }

    Ok(Some(skill))
}

/// Damage `side` would deal with `skill` (or a basic attack) at the given crit.
pub fn project_damage(
    battle: &Match,
    side: Side,
    skill: Option<&Skill>,
    critical: bool,
    config: &BattleConfig,
) -> u32 {
    let power = skill.map_or(BASIC_ATTACK_POWER, |skill| skill.power);
    calculate_damage(
        battle.snapshot(side),
        battle.snapshot(side.opponent()),
        power,
        critical,
        config,
    )
}

/// Resolve one round in place.
///
/// Both actions are validated before anything is written; on error the match
/// is untouched. On success the round counter and version each advance by one.
pub fn resolve_round(
    battle: &mut Match,
    challenger_action: &BattleAction,
    defender_action: &BattleAction,
    rolls: RoundRolls,
    config: &BattleConfig,
    now: DateTime<Utc>,
) -> Result<RoundOutcome, ActionError> {
    let challenger_skill = validate_action(battle, Side::Challenger, challenger_action)?.cloned();
    let defender_skill = validate_action(battle, Side::Defender, defender_action)?.cloned();

    // Everything below reads start-of-round state only.
    let strike = |side: Side, skill: Option<&Skill>, action: &BattleAction| {
        let critical = is_critical(battle.snapshot(side).stats.crit_chance, rolls.crit_roll(side));
        ActionOutcome {
            action: action.clone(),
            damage: project_damage(battle, side, skill, critical, config),
            critical,
        }
    };
    let challenger = strike(Side::Challenger, challenger_skill.as_ref(), challenger_action);
    let defender = strike(Side::Defender, defender_skill.as_ref(), defender_action);

    let challenger_hp = apply_damage(battle.challenger_state.hp, defender.damage);
    let defender_hp = apply_damage(battle.defender_state.hp, challenger.damage);

    battle.challenger_state.hp = challenger_hp;
    battle.defender_state.hp = defender_hp;
    battle
        .challenger_state
        .advance_cooldowns(challenger_skill.as_ref());
    battle.defender_state.advance_cooldowns(defender_skill.as_ref());
    battle.round += 1;
    battle.version += 1;
    battle.last_action_at = now;

    let winner = match (challenger_hp, defender_hp) {
        (0, 0) => Some(battle.first_striker),
        (0, _) => Some(Side::Defender),
        (_, 0) => Some(Side::Challenger),
        _ => None,
    };
    if let Some(side) = winner {
        battle.complete(side, CompletionReason::Knockout);
    }

    Ok(RoundOutcome {
        round: battle.round,
        challenger,
        defender,
        challenger_hp,
        defender_hp,
        winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        CombatantSnapshot, CreatureId, CreatureProfile, MatchId, MatchStatus, PlayerId, StatBlock,
        Tier,
    };

    fn snapshot(id: u64, stats: StatBlock, skills: Vec<Skill>) -> CombatantSnapshot {
        CombatantSnapshot::capture(&CreatureProfile {
            id: CreatureId(id),
            owner: PlayerId(id),
            owner_name: format!("owner-{id}"),
            name: format!("pet-{id}"),
            species: String::new(),
            element: String::new(),
            tier: Tier::BASE,
            level: 1,
            stats,
            skills,
        })
    }

    fn example_match() -> Match {
        let a = snapshot(
            1,
            StatBlock::new(50, 20, 200, 30, 10),
            vec![Skill::active("Flame Fang", 150, Some(2))],
        );
        let b = snapshot(2, StatBlock::new(40, 25, 220, 25, 5), vec![]);
        Match::new(MatchId(1), a, b, 1234, Utc::now())
    }

    #[test]
    fn example_first_round() {
        let mut battle = example_match();
        let config = BattleConfig::default();

        let outcome = resolve_round(
            &mut battle,
            &BattleAction::Attack,
            &BattleAction::Attack,
            RoundRolls::NO_CRIT,
            &config,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(outcome.challenger.damage, 38);
        assert_eq!(outcome.defender.damage, 30);
        assert_eq!(battle.hp(Side::Defender), 182);
        assert_eq!(battle.hp(Side::Challenger), 170);
        assert_eq!(battle.round, 1);
        assert_eq!(battle.version, 1);
        assert!(!outcome.is_over());
    }

    #[test]
    fn resolution_is_deterministic() {
        let config = BattleConfig::default();
        let rolls = RoundRolls {
            challenger_crit: 3,
            defender_crit: 50,
        };
        let mut first = example_match();
        let mut second = first.clone();
        let now = first.created_at;

        let attack = BattleAction::Attack;
        let a = resolve_round(&mut first, &attack, &attack, rolls, &config, now);
        let b = resolve_round(&mut second, &attack, &attack, rolls, &config, now);

        assert_eq!(a, b);
        assert_eq!(first, second);
        assert!(a.unwrap().challenger.critical);
    }

    #[test]
    fn damage_uses_start_of_round_hp() {
        let config = BattleConfig::default();
        let a = snapshot(1, StatBlock::new(100, 0, 10, 10, 0), vec![]);
        let b = snapshot(2, StatBlock::new(100, 0, 10, 5, 0), vec![]);
        let mut battle = Match::new(MatchId(1), a, b, 0, Utc::now());

        let outcome = resolve_round(
            &mut battle,
            &BattleAction::Attack,
            &BattleAction::Attack,
            RoundRolls::NO_CRIT,
            &config,
            Utc::now(),
        )
        .unwrap();

        // Both sides still strike even though each blow is lethal.
        assert_eq!(outcome.challenger.damage, 100);
        assert_eq!(outcome.defender.damage, 100);
        assert_eq!(outcome.challenger_hp, 0);
        assert_eq!(outcome.defender_hp, 0);
        // Simultaneous knockout goes to the faster side.
        assert_eq!(outcome.winner, Some(Side::Challenger));
        assert_eq!(battle.winner, Some(CreatureId(1)));
        assert_eq!(battle.status, MatchStatus::Complete);
    }

    #[test]
    fn simultaneous_knockout_favors_faster_defender() {
        let config = BattleConfig::default();
        let a = snapshot(1, StatBlock::new(100, 0, 10, 5, 0), vec![]);
        let b = snapshot(2, StatBlock::new(100, 0, 10, 50, 0), vec![]);
        let mut battle = Match::new(MatchId(1), a, b, 0, Utc::now());

        let outcome = resolve_round(
            &mut battle,
            &BattleAction::Attack,
            &BattleAction::Attack,
            RoundRolls::NO_CRIT,
            &config,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(outcome.winner, Some(Side::Defender));
    }

    #[test]
    fn skill_goes_on_cooldown_and_is_rejected() {
        let config = BattleConfig::default();
        let mut battle = example_match();
        let fang = BattleAction::skill("Flame Fang");

        let outcome = resolve_round(
            &mut battle,
            &fang,
            &BattleAction::Attack,
            RoundRolls::NO_CRIT,
            &config,
            Utc::now(),
        )
        .unwrap();
        // 50 × 1.5 = 75 - 12.5 = 62.5 → 63
        assert_eq!(outcome.challenger.damage, 63);

        let before = battle.clone();
        let err = resolve_round(
            &mut battle,
            &fang,
            &BattleAction::Attack,
            RoundRolls::NO_CRIT,
            &config,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ActionError::SkillOnCooldown {
                name: "Flame Fang".into(),
                remaining: 2
            }
        );
        assert_eq!(battle, before);
    }

    #[test]
    fn unknown_and_passive_skills_are_invalid() {
        let mut battle = example_match();
        battle
            .challenger
            .skills
            .push(Skill::passive("Ember Skin", crate::state::PassiveStat::Defense, 110));

        assert_eq!(
            validate_action(&battle, Side::Challenger, &BattleAction::skill("Nope")).unwrap_err(),
            ActionError::UnknownSkill { name: "Nope".into() }
        );
        assert_eq!(
            validate_action(&battle, Side::Challenger, &BattleAction::skill("Ember Skin"))
                .unwrap_err(),
            ActionError::PassiveSkill {
                name: "Ember Skin".into()
            }
        );
    }

    #[test]
    fn hp_stays_in_bounds_until_completion() {
        let config = BattleConfig::default();
        let mut battle = example_match();
        let mut round = 0;

        while battle.is_open() {
            round += 1;
            let rolls = RoundRolls {
                challenger_crit: round % 100,
                defender_crit: (round * 7) % 100,
            };
            let outcome = resolve_round(
                &mut battle,
                &BattleAction::Attack,
                &BattleAction::Attack,
                rolls,
                &config,
                Utc::now(),
            )
            .unwrap();
            assert!(outcome.challenger_hp <= battle.challenger.stats.max_hp);
            assert!(outcome.defender_hp <= battle.defender.stats.max_hp);
            assert_eq!(battle.version, round as u64);
            assert!(round < 1_000, "match failed to terminate");
        }

        assert!(battle.winner.is_some());
        assert!(matches!(
            validate_action(&battle, Side::Challenger, &BattleAction::Attack),
            Err(ActionError::MatchComplete)
        ));
    }

    #[test]
    fn minimum_damage_guarantees_termination() {
        let config = BattleConfig::default();
        let a = snapshot(1, StatBlock::new(1, 1000, 30, 1, 0), vec![]);
        let b = snapshot(2, StatBlock::new(1, 1000, 40, 2, 0), vec![]);
        let mut battle = Match::new(MatchId(1), a, b, 0, Utc::now());

        let mut rounds = 0;
        while battle.is_open() {
            resolve_round(
                &mut battle,
                &BattleAction::Attack,
                &BattleAction::Attack,
                RoundRolls::NO_CRIT,
                &config,
                Utc::now(),
            )
            .unwrap();
            rounds += 1;
        }

        assert_eq!(rounds, 30);
        assert_eq!(battle.winner, Some(CreatureId(2)));
    }
}
