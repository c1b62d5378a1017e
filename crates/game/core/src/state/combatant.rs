//! Creature profiles and the frozen combatant snapshots taken from them.
//!
//! A [`CreatureProfile`] is the live catalog record and may change at any time
//! (levels, equipment). A [`CombatantSnapshot`] is captured once when a match
//! starts and never changes afterwards, so the contest stays reproducible.

use super::common::{CreatureId, PlayerId};

// ============================================================================
// Stats
// ============================================================================

/// Combat-relevant attributes of a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StatBlock {
    pub attack: u32,
    pub defense: u32,
    pub max_hp: u32,
    pub speed: u32,
    /// Critical hit chance in percent (0-100).
    pub crit_chance: u32,
}

impl StatBlock {
    pub const fn new(attack: u32, defense: u32, max_hp: u32, speed: u32, crit_chance: u32) -> Self {
        Self {
            attack,
            defense,
            max_hp,
            speed,
            crit_chance,
        }
    }
}

/// Cultivation tier of a creature. Tier 1 is the baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tier(pub u8);

impl Tier {
    pub const BASE: Self = Self(1);

    /// Percentage applied to attack, defense and max HP.
    ///
    /// `100 + 15 × (tier - 1)`; tier 0 is treated as tier 1.
    pub const fn scale_pct(self) -> u32 {
        let steps = if self.0 == 0 { 0 } else { self.0 as u32 - 1 };
        100 + 15 * steps
    }

    /// Scale a base stat block. Speed and crit chance are not tier-scaled.
    pub fn scale(self, base: &StatBlock) -> StatBlock {
        let pct = u64::from(self.scale_pct());
        let scale = |value: u32| apply_pct(value, pct);
        StatBlock {
            attack: scale(base.attack),
            defense: scale(base.defense),
            max_hp: scale(base.max_hp).max(1),
            speed: base.speed,
            crit_chance: base.crit_chance.min(100),
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Self::BASE
    }
}

// ============================================================================
// Skills
// ============================================================================

/// Stat touched by a passive skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassiveStat {
    /// Multiplies the owner's attack.
    Attack,
    /// Multiplies the owner's defense.
    Defense,
    /// Multiplies damage the owner receives.
    Ward,
}

/// Whether a skill is selectable or always on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillKind {
    /// Consumes the round's action.
    Active,
    /// Applied during every resolution; never selectable.
    Passive(PassiveStat),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Skill {
    pub name: String,
    pub kind: SkillKind,
    /// Multiplier in percent; 100 equals a basic attack.
    pub power: u32,
    /// Rounds the skill stays unavailable after use.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: Option<u32>,
}

impl Skill {
    pub fn active(name: impl Into<String>, power: u32, cooldown: Option<u32>) -> Self {
        Self {
            name: name.into(),
            kind: SkillKind::Active,
            power,
            cooldown,
        }
    }

    pub fn passive(name: impl Into<String>, stat: PassiveStat, power: u32) -> Self {
        Self {
            name: name.into(),
            kind: SkillKind::Passive(stat),
            power,
            cooldown: None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.kind, SkillKind::Active)
    }
}

// ============================================================================
// Catalog profile
// ============================================================================

/// Live creature record as served by the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CreatureProfile {
    pub id: CreatureId,
    pub owner: PlayerId,
    pub owner_name: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub species: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tier: Tier,
    #[cfg_attr(feature = "serde", serde(default))]
    pub level: u32,
    pub stats: StatBlock,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<Skill>,
}

// ============================================================================
// Snapshot
// ============================================================================

/// Frozen copy of a creature for the lifetime of one match.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CombatantSnapshot {
    pub owner: PlayerId,
    pub creature: CreatureId,
    pub name: String,
    pub species: String,
    pub element: String,
    pub tier: Tier,
    /// Tier-scaled stats; the values used during resolution.
    pub stats: StatBlock,
    pub skills: Vec<Skill>,
}

impl CombatantSnapshot {
    /// Capture a snapshot from the current catalog profile.
    pub fn capture(profile: &CreatureProfile) -> Self {
        Self {
            owner: profile.owner,
            creature: profile.id,
            name: profile.name.clone(),
            species: profile.species.clone(),
            element: profile.element.clone(),
            tier: profile.tier,
            stats: profile.tier.scale(&profile.stats),
            skills: profile.skills.clone(),
        }
    }

    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|skill| skill.name == name)
    }

    pub fn active_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|skill| skill.is_active())
    }

    /// Product of all passive multipliers for `stat`, in percent.
    pub fn passive_pct(&self, stat: PassiveStat) -> u32 {
        let pct = self
            .skills
            .iter()
            .filter(|skill| skill.kind == SkillKind::Passive(stat))
            .fold(100u64, |acc, skill| {
                acc.saturating_mul(u64::from(skill.power)) / 100
            });
        u32::try_from(pct).unwrap_or(u32::MAX)
    }

    /// Attack after passive modifiers.
    pub fn effective_attack(&self) -> u32 {
        apply_pct(self.stats.attack, u64::from(self.passive_pct(PassiveStat::Attack)))
    }

    /// Defense after passive modifiers.
    pub fn effective_defense(&self) -> u32 {
        apply_pct(self.stats.defense, u64::from(self.passive_pct(PassiveStat::Defense)))
    }
}

/// `value × pct / 100`, saturating at `u32::MAX`.
fn apply_pct(value: u32, pct: u64) -> u32 {
    u32::try_from(u64::from(value).saturating_mul(pct) / 100).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(tier: u8) -> CreatureProfile {
        CreatureProfile {
            id: CreatureId(7),
            owner: PlayerId(1),
            owner_name: "Lin".into(),
            name: "Azure Fox".into(),
            species: "fox".into(),
            element: "water".into(),
            tier: Tier(tier),
            level: 12,
            stats: StatBlock::new(40, 20, 200, 30, 10),
            skills: vec![
                Skill::active("Tidal Bite", 150, Some(2)),
                Skill::passive("Thick Hide", PassiveStat::Defense, 120),
            ],
        }
    }

    #[test]
    fn tier_one_keeps_base_stats() {
        let snapshot = CombatantSnapshot::capture(&profile(1));
        assert_eq!(snapshot.stats, StatBlock::new(40, 20, 200, 30, 10));
    }

    #[test]
    fn higher_tier_scales_attack_defense_and_hp() {
        // tier 3: 130%
        let snapshot = CombatantSnapshot::capture(&profile(3));
        assert_eq!(snapshot.stats.attack, 52);
        assert_eq!(snapshot.stats.defense, 26);
        assert_eq!(snapshot.stats.max_hp, 260);
        assert_eq!(snapshot.stats.speed, 30);
        assert_eq!(snapshot.stats.crit_chance, 10);
    }

    #[test]
    fn snapshot_is_detached_from_profile() {
        let mut live = profile(1);
        let snapshot = CombatantSnapshot::capture(&live);

        live.stats.attack = 999;
        live.skills.clear();

        assert_eq!(snapshot.stats.attack, 40);
        assert_eq!(snapshot.skills.len(), 2);
    }

    #[test]
    fn oversized_values_saturate() {
        let mut huge = profile(10);
        huge.stats = StatBlock::new(u32::MAX, u32::MAX, u32::MAX, 1, 0);
        huge.skills = vec![Skill::passive("Rage", PassiveStat::Attack, u32::MAX); 8];

        let snapshot = CombatantSnapshot::capture(&huge);
        assert_eq!(snapshot.stats.attack, u32::MAX);
        assert_eq!(snapshot.stats.max_hp, u32::MAX);
        assert_eq!(snapshot.passive_pct(PassiveStat::Attack), u32::MAX);
        assert_eq!(snapshot.effective_attack(), u32::MAX);
    }

    #[test]
    fn passives_modify_effective_stats() {
        let snapshot = CombatantSnapshot::capture(&profile(1));
        assert_eq!(snapshot.effective_attack(), 40);
        assert_eq!(snapshot.effective_defense(), 24);
        assert_eq!(snapshot.passive_pct(PassiveStat::Ward), 100);
    }
}
