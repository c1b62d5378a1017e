//! HTTP handlers and wire types for the PvP API.

use arena_core::{
    ActionOutcome, BattleAction, CombatantSnapshot, CreatureId, Match, MatchId, PlayerId, Side,
};
use arena_runtime::{
    BattleError, LeaderboardEntry, MatchHistoryEntry, OpponentEntry, RoundReport, SubmitAction,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

type ApiResult<T> = Result<Json<T>, ApiError>;

// Extractors are taken as `Result` so rejections render through `ApiError`.
type JsonBody<T> = Result<Json<T>, JsonRejection>;
type QueryParams<T> = Result<Query<T>, QueryRejection>;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub user_id: u64,
    pub opponent_pet_id: u64,
    #[serde(default)]
    pub pet_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub user_id: u64,
    pub match_id: u64,
    /// `"attack"` or `"skill"`.
    pub action: String,
    #[serde(default)]
    pub skill_name: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

impl ActionRequest {
    fn battle_action(&self) -> Result<BattleAction, BattleError> {
        match self.action.as_str() {
            "attack" => Ok(BattleAction::Attack),
            "skill" => match self.skill_name.as_deref() {
                Some(name) if !name.is_empty() => Ok(BattleAction::skill(name)),
                _ => Err(BattleError::InvalidAction(
                    "skill action requires skillName".into(),
                )),
            },
            other => Err(BattleError::InvalidAction(format!(
                "unknown action {other:?}"
            ))),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub match_id: MatchId,
    pub my_pet: CombatantSnapshot,
    pub opp_pet: CombatantSnapshot,
    pub my_hp: u32,
    pub opp_hp: u32,
    pub version: u64,
}

impl From<Match> for ChallengeResponse {
    fn from(battle: Match) -> Self {
        Self {
            match_id: battle.id,
            my_hp: battle.hp(Side::Challenger),
            opp_hp: battle.hp(Side::Defender),
            version: battle.version,
            my_pet: battle.challenger,
            opp_pet: battle.defender,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActionView {
    pub action: String,
    pub damage: u32,
    pub critical: bool,
}

impl From<&ActionOutcome> for ActionView {
    fn from(outcome: &ActionOutcome) -> Self {
        Self {
            action: outcome.action.label().to_string(),
            damage: outcome.damage,
            critical: outcome.critical,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub player: ActionView,
    pub ai: ActionView,
    pub my_hp: u32,
    pub opp_hp: u32,
    pub round: u32,
    pub version: u64,
    pub is_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<CreatureId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elo_change: Option<i64>,
}

impl From<RoundReport> for ActionResponse {
    fn from(report: RoundReport) -> Self {
        let outcome = &report.outcome;
        Self {
            player: (&outcome.challenger).into(),
            ai: (&outcome.defender).into(),
            my_hp: outcome.challenger_hp,
            opp_hp: outcome.defender_hp,
            round: outcome.round,
            version: report.version,
            is_over: report.is_over(),
            winner_id: report.winner,
            elo_change: report.challenger_rating_delta(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> &'static str {
    "ok"
}

pub async fn opponents(
    State(state): State<AppState>,
    query: QueryParams<UserQuery>,
) -> ApiResult<Vec<OpponentEntry>> {
    let Query(query) = query?;
    let entries = state.service.opponents(PlayerId(query.user_id)).await?;
    Ok(Json(entries))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    query: QueryParams<LeaderboardQuery>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let Query(query) = query?;
    let rows = state.service.leaderboard(query.limit).await?;
    Ok(Json(rows))
}

pub async fn history(
    State(state): State<AppState>,
    query: QueryParams<UserQuery>,
) -> ApiResult<Vec<MatchHistoryEntry>> {
    let Query(query) = query?;
    let entries = state.service.history(PlayerId(query.user_id)).await?;
    Ok(Json(entries))
}

pub async fn challenge(
    State(state): State<AppState>,
    body: JsonBody<ChallengeRequest>,
) -> ApiResult<ChallengeResponse> {
    let Json(req) = body?;
    let battle = state
        .service
        .start_match(
            PlayerId(req.user_id),
            req.pet_id.map(CreatureId),
            CreatureId(req.opponent_pet_id),
        )
        .await?;
    Ok(Json(battle.into()))
}

pub async fn action(
    State(state): State<AppState>,
    body: JsonBody<ActionRequest>,
) -> ApiResult<ActionResponse> {
    let Json(req) = body?;
    let action = req.battle_action()?;
    let report = state
        .service
        .submit_action(SubmitAction {
            player: PlayerId(req.user_id),
            match_id: MatchId(req.match_id),
            expected_version: req.version,
            action,
        })
        .await?;
    Ok(Json(report.into()))
}

pub async fn match_view(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Match> {
    let Path(id) = path?;
    let battle = state.service.match_view(MatchId(id)).await?;
    Ok(Json(battle))
}
