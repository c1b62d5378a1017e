//! Public runtime API surface.
//!
//! Error types shared by the service, the runtime builder and the HTTP layer.

pub mod errors;

pub use errors::{BattleError, RejectReason, Result, RuntimeError};
