//! Battle state types.
//!
//! - [`common`]: identifiers and sides
//! - [`combatant`]: catalog profiles, stats, skills, and frozen snapshots
//! - [`battle`]: the versioned [`Match`] record
mod battle;
mod combatant;
mod common;

pub use battle::{CompletionReason, Match, MatchStatus, SideState};
pub use combatant::{
    CombatantSnapshot, CreatureProfile, PassiveStat, Skill, SkillKind, StatBlock, Tier,
};
pub use common::{CreatureId, MatchId, PlayerId, Side};
