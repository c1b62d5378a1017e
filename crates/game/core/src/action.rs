//! Actions a combatant can take in a round.

use std::fmt;

/// Closed set of round actions.
///
/// A basic attack needs no lookup; a skill is named and must resolve to an
/// active, off-cooldown skill on the acting snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", content = "name", rename_all = "snake_case")
)]
pub enum BattleAction {
    Attack,
    Skill(String),
}

impl BattleAction {
    pub fn skill(name: impl Into<String>) -> Self {
        Self::Skill(name.into())
    }

    /// Human-readable label shown to clients ("attack" or the skill name).
    pub fn label(&self) -> &str {
        match self {
            BattleAction::Attack => "attack",
            BattleAction::Skill(name) => name,
        }
    }

    pub fn skill_name(&self) -> Option<&str> {
        match self {
            BattleAction::Attack => None,
            BattleAction::Skill(name) => Some(name),
        }
    }
}

impl fmt::Display for BattleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
