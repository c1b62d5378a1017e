//! Unified error types surfaced by the runtime API.
//!
//! [`BattleError`] is the machine-readable taxonomy every battle operation
//! reports to clients. [`RuntimeError`] covers wiring and worker failures.
use arena_core::{ActionError, ErrorSeverity};
use thiserror::Error;

pub use crate::oracle::OracleError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, BattleError>;

/// Why an otherwise well-formed action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    /// Caller does not own the combatant it acts for.
    WrongSubmitter,
    /// The match has already ended.
    MatchComplete,
    /// The submitted version is behind the stored one.
    StaleVersion,
    /// The chosen skill is still cooling down.
    SkillOnCooldown,
}

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("opponent creature {0} is unavailable")]
    OpponentUnavailable(arena_core::CreatureId),

    #[error("a creature cannot challenge itself or its owner's creatures")]
    SelfChallengeRejected,

    #[error("an open match already exists between these creatures")]
    DuplicateMatch,

    #[error("match {0} not found")]
    MatchNotFound(arena_core::MatchId),

    #[error("action rejected ({reason}): {detail}")]
    ActionRejected { reason: RejectReason, detail: String },

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl BattleError {
    pub fn rejected(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self::ActionRejected {
            reason,
            detail: detail.into(),
        }
    }

    /// Stable identifier for clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OpponentUnavailable(_) => "OpponentUnavailable",
            Self::SelfChallengeRejected => "SelfChallengeRejected",
            Self::DuplicateMatch => "DuplicateMatch",
            Self::MatchNotFound(_) => "MatchNotFound",
            Self::ActionRejected { .. } => "ActionRejected",
            Self::InvalidAction(_) => "InvalidAction",
            Self::Repository(_) | Self::Oracle(_) => "Internal",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActionRejected { .. } | Self::DuplicateMatch => ErrorSeverity::Recoverable,
            Self::Repository(_) | Self::Oracle(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }
}

impl From<ActionError> for BattleError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::UnknownSkill { .. } | ActionError::PassiveSkill { .. } => {
                Self::InvalidAction(err.to_string())
            }
            ActionError::SkillOnCooldown { .. } => {
                Self::rejected(RejectReason::SkillOnCooldown, err.to_string())
            }
            ActionError::MatchComplete => {
                Self::rejected(RejectReason::MatchComplete, err.to_string())
            }
        }
    }
}

/// Failures while assembling or shutting down the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a creature roster to be configured before building")]
    MissingRoster,

    #[error("sweep worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}
