//! Mapping of battle errors onto HTTP responses.

use arena_core::ErrorSeverity;
use arena_runtime::BattleError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Handler error: a [`BattleError`] rendered as `{"error": {kind, message}}`.
#[derive(Debug)]
pub struct ApiError(pub BattleError);

impl From<BattleError> for ApiError {
    fn from(err: BattleError) -> Self {
        Self(err)
    }
}

// Malformed bodies, queries and paths answer in the same JSON shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(BattleError::InvalidAction(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(BattleError::InvalidAction(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(BattleError::InvalidAction(rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BattleError::MatchNotFound(_) | BattleError::OpponentUnavailable(_) => {
                StatusCode::NOT_FOUND
            }
            BattleError::DuplicateMatch | BattleError::ActionRejected { .. } => {
                StatusCode::CONFLICT
            }
            BattleError::SelfChallengeRejected | BattleError::InvalidAction(_) => {
                StatusCode::BAD_REQUEST
            }
            BattleError::Repository(_) | BattleError::Oracle(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = &self.0;

        match err.severity() {
            ErrorSeverity::Internal => tracing::error!(kind = err.kind(), error = %err, "Request failed"),
            _ => tracing::warn!(kind = err.kind(), error = %err, "Request rejected"),
        }

        let reason = match err {
            BattleError::ActionRejected { reason, .. } => Some(<&'static str>::from(*reason)),
            _ => None,
        };
        // Storage details stay in the logs.
        let message = if err.severity().is_internal() {
            "internal storage error".to_string()
        } else {
            err.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                kind: err.kind(),
                reason,
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{CreatureId, MatchId};
    use arena_runtime::{RejectReason, RepositoryError};

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (BattleError::MatchNotFound(MatchId(1)), StatusCode::NOT_FOUND),
            (
                BattleError::OpponentUnavailable(CreatureId(1)),
                StatusCode::NOT_FOUND,
            ),
            (BattleError::DuplicateMatch, StatusCode::CONFLICT),
            (
                BattleError::rejected(RejectReason::StaleVersion, "stale"),
                StatusCode::CONFLICT,
            ),
            (BattleError::SelfChallengeRejected, StatusCode::BAD_REQUEST),
            (
                BattleError::InvalidAction("dance".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                BattleError::Repository(RepositoryError::LockPoisoned),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }
}
