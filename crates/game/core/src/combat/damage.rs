//! Damage calculation and application.

use crate::config::BattleConfig;
use crate::state::{CombatantSnapshot, PassiveStat};

/// Power of a basic attack, in percent.
pub const BASIC_ATTACK_POWER: u32 = 100;

/// Whether a percentile roll in `[0, 100)` lands a critical hit.
#[inline]
pub fn is_critical(crit_chance: u32, roll: u32) -> bool {
    roll < crit_chance
}

/// Calculate damage dealt by `attacker` to `defender`.
///
/// # Formula
///
/// All intermediate values are in hundredths of a hit point.
///
/// ```text
/// base      = attack × power
/// mitigated = max(100, base - defense × mitigation_pct)
/// scaled    = critical ? mitigated × crit_multiplier_pct / 100 : mitigated
/// warded    = scaled × defender_ward_pct / 100
/// damage    = max(1, round(warded / 100))
/// ```
///
/// Attack and defense include passive modifiers. The floor of one damage
/// guarantees every round makes progress.
pub fn calculate_damage(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    power: u32,
    is_critical: bool,
    config: &BattleConfig,
) -> u32 {
    let base = u64::from(attacker.effective_attack()) * u64::from(power);
    let reduction = u64::from(defender.effective_defense()) * u64::from(config.mitigation_pct);
    let mitigated = base.saturating_sub(reduction).max(100);

    let scaled = if is_critical {
        mitigated.saturating_mul(u64::from(config.crit_multiplier_pct)) / 100
    } else {
        mitigated
    };

    let warded = scaled.saturating_mul(u64::from(defender.passive_pct(PassiveStat::Ward))) / 100;

    // round half up
    let damage = warded.saturating_add(50) / 100;
    damage.clamp(1, u32::MAX as u64) as u32
}

/// Apply damage to current HP, clamped at 0.
#[inline]
pub fn apply_damage(current_hp: u32, damage: u32) -> u32 {
    current_hp.saturating_sub(damage)
}
