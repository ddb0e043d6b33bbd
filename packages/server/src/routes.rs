use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};

use crate::models::{error::GameError, response::ErrorResponse};
use crate::state::AppState;

mod game;
mod round;

pub fn create_routes(state: AppState) -> Router {
    Router::new().nest(
        "/api/games",
        game::routes(state.clone()).merge(round::routes(state)),
    )
}

pub fn status_for(error: &GameError) -> StatusCode {
    match error {
        GameError::InvalidRosterSize(_)
        | GameError::InvalidGroupSize { .. }
        | GameError::InvalidGroupMember(_)
        | GameError::BadRequest(_) => StatusCode::BAD_REQUEST,
        GameError::Unauthorized(_) | GameError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        GameError::Forbidden(_) | GameError::NotInGroup(_) | GameError::RoleNotPermitted(_) => {
            StatusCode::FORBIDDEN
        }
        GameError::NotFound(_) => StatusCode::NOT_FOUND,
        GameError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        GameError::PlayerAlreadyJoined(_) | GameError::GameFull => StatusCode::CONFLICT,
        GameError::InvalidPhase(_) | GameError::AlreadyAssigned => {
            StatusCode::PRECONDITION_REQUIRED
        }
        GameError::PersistenceFailure(_) | GameError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// {status, msg} body plus an X-msg header for HEAD callers
impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let msg = self.to_string();
        if status.is_server_error() {
            tracing::error!(error = %msg, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %msg, "request rejected");
        }

        let mut response = (
            status,
            Json(ErrorResponse {
                status: status.as_u16(),
                msg: msg.clone(),
            }),
        )
            .into_response();
        if let Ok(value) = HeaderValue::from_str(&msg) {
            response.headers_mut().insert("x-msg", value);
        }
        response
    }
}

/// Malformed JSON is a 400, whatever axum's own rejection says.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, GameError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| GameError::BadRequest(rejection.body_text()))
}
