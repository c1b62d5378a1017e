//! HTTP surface of the PvP arena.
//!
//! [`router`] wires the JSON endpoints onto a [`BattleService`]; the binary in
//! `main.rs` adds configuration, logging and the listener.
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

use arena_runtime::BattleService;
use axum::Router;
use axum::routing::{get, post};

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: BattleService,
}

pub fn router(service: BattleService) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/pvp/opponents", get(routes::opponents))
        .route("/api/pvp/leaderboard", get(routes::leaderboard))
        .route("/api/pvp/history", get(routes::history))
        .route("/api/pvp/challenge", post(routes::challenge))
        .route("/api/pvp/action", post(routes::action))
        .route("/api/pvp/match/{id}", get(routes::match_view))
        .with_state(AppState { service })
}
