//! Deterministic battle rules shared by the runtime and offline tools.
//!
//! `arena-core` defines the canonical PvP rules (snapshots, match state, round
//! resolution, rating) as pure APIs with no I/O. All match mutation flows
//! through [`combat::resolve_round`] or [`Match::forfeit`], and supporting
//! crates depend on the types re-exported here.
pub mod action;
pub mod combat;
pub mod config;
pub mod error;
pub mod policy;
pub mod rating;
pub mod rng;
pub mod state;

pub use action::BattleAction;
pub use combat::{ActionOutcome, RoundOutcome, project_damage, resolve_round, validate_action};
pub use config::BattleConfig;
pub use error::{ActionError, ErrorSeverity};
pub use policy::{BasicAttackPolicy, OpponentPolicy, WeightedOpponentPolicy};
pub use rating::{EloRating, RatingChange, RatingRecord};
pub use rng::{PcgRng, RngOracle, RollContext, RoundRolls, compute_seed};
pub use state::{
    CombatantSnapshot, CompletionReason, CreatureId, CreatureProfile, Match, MatchId,
    MatchStatus, PassiveStat, PlayerId, Side, SideState, Skill, SkillKind, StatBlock, Tier,
};
