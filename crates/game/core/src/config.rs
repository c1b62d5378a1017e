/// Tunable battle constants.
///
/// All percentages are integers (100 = 1.0×) so resolution stays exact.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Share of the defender's defense subtracted from raw damage.
    pub mitigation_pct: u32,
    /// Damage multiplier applied on a critical hit.
    pub crit_multiplier_pct: u32,
    /// Elo K-factor.
    pub k_factor: u32,
    /// Rating assigned to creatures that have never fought.
    pub initial_rating: u32,
    /// Chance the opponent policy picks a skill over a basic attack.
    pub skill_weight_pct: u32,
}

impl BattleConfig {
    pub const DEFAULT_MITIGATION_PCT: u32 = 50;
    pub const DEFAULT_CRIT_MULTIPLIER_PCT: u32 = 150;
    pub const DEFAULT_K_FACTOR: u32 = 32;
    pub const DEFAULT_INITIAL_RATING: u32 = 1000;
    pub const DEFAULT_SKILL_WEIGHT_PCT: u32 = 60;

    pub fn new() -> Self {
        Self {
            mitigation_pct: Self::DEFAULT_MITIGATION_PCT,
            crit_multiplier_pct: Self::DEFAULT_CRIT_MULTIPLIER_PCT,
            k_factor: Self::DEFAULT_K_FACTOR,
            initial_rating: Self::DEFAULT_INITIAL_RATING,
            skill_weight_pct: Self::DEFAULT_SKILL_WEIGHT_PCT,
        }
    }

    pub fn with_k_factor(mut self, k_factor: u32) -> Self {
        self.k_factor = k_factor;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
