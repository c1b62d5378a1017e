//! Combat resolution system.
//!
//! Pure functions only: given a match, two actions and the round's rolls,
//! produce the damage, the new HP values and the termination result.
//!
//! # Core Functions
//!
//! - `calculate_damage`: attack/defense/crit/ward damage formula
//! - `validate_action`: cooldown and skill checks for one side
//! - `resolve_round`: simultaneous resolution of both sides' actions

pub mod damage;
pub mod resolve;

pub use damage::{BASIC_ATTACK_POWER, apply_damage, calculate_damage, is_critical};
pub use resolve::{ActionOutcome, RoundOutcome, project_damage, resolve_round, validate_action};
