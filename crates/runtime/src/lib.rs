//! Runtime orchestration for the PvP arena.
//!
//! This crate wires together the creature roster oracle, repositories, the
//! opponent policy and background workers into a cohesive battle API.
//! Consumers embed [`ArenaRuntime`] and drive matches through the
//! [`BattleService`] it hands out.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`service`] implements match start, round submission and queries
//! - [`api`] exposes the error types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod runtime;
pub mod service;

mod workers;

pub use api::{BattleError, RejectReason, Result, RuntimeError};
pub use events::{Event, EventBus, MatchEvent, RatingEvent, Topic};
pub use oracle::{CreatureOracle, InMemoryRoster, OracleError, RosterFile};
pub use repository::{
    ArenaRepository, HistoryParticipant, HistoryRepository, InMemoryArenaStore, MatchCommit,
    MatchHistoryEntry, MatchRepository, RatingRepository, RepositoryError, Settlement,
};
pub use runtime::{ArenaRuntime, ArenaRuntimeBuilder, RuntimeConfig};
pub use service::{BattleService, LeaderboardEntry, OpponentEntry, RoundReport, SubmitAction};
