//! Rule violations raised while validating or resolving a round.
//!
//! Errors are classified by severity so callers can pick a log level and
//! decide whether a client may retry.

/// Severity level of an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The request conflicts with current state; retrying with fresh state may succeed.
    ///
    /// Examples: stale version, skill on cooldown
    Recoverable,

    /// Invalid input that should not be retried unchanged.
    ///
    /// Examples: unknown skill, passive skill selected as action
    Validation,

    /// Unexpected inconsistency; indicates a bug or storage failure.
    Internal,
}

impl ErrorSeverity {
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Reasons a submitted action cannot be applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unknown skill '{name}'")]
    UnknownSkill { name: String },

    #[error("skill '{name}' is passive and cannot be used as an action")]
    PassiveSkill { name: String },

    #[error("skill '{name}' is on cooldown for {remaining} more round(s)")]
    SkillOnCooldown { name: String, remaining: u32 },

    #[error("match is already complete")]
    MatchComplete,
}
