use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::json_body;
use crate::{
    models::{
        error::GameError,
        response::{ApiResponse, MissionActionRequest, ProposeGroupRequest, VoteRequest},
    },
    services::game_service,
    state::AppState,
    utils::auth::Credentials,
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/:game_id/rounds", get(get_rounds))
        .route(
            "/:game_id/rounds/:round_id",
            get(get_round)
                .patch(propose_group)
                .post(submit_vote)
                .put(submit_mission_action),
        )
        .with_state(state)
}

async fn get_rounds(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GameError> {
    let caller = Credentials::from_headers(&headers)?;
    let rounds = game_service::get_rounds(&state, &game_id, &caller).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(200, "Rounds Retrieved", rounds)),
    ))
}

async fn get_round(
    State(state): State<AppState>,
    Path((game_id, round_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GameError> {
    let caller = Credentials::from_headers(&headers)?;
    let round = game_service::get_round(&state, &game_id, &round_id, &caller).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(200, "Round Retrieved", round)),
    ))
}

async fn propose_group(
    State(state): State<AppState>,
    Path((game_id, round_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<ProposeGroupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GameError> {
    let caller = Credentials::from_headers(&headers)?;
    let req = json_body(payload)?;
    let round =
        game_service::propose_group(&state, &game_id, &round_id, &caller, req.group).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(200, "Group Created", round)),
    ))
}

async fn submit_vote(
    State(state): State<AppState>,
    Path((game_id, round_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GameError> {
    let caller = Credentials::from_headers(&headers)?;
    let req = json_body(payload)?;
    let round = game_service::submit_vote(&state, &game_id, &round_id, &caller, req.vote).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(200, "Voted successfully", round)),
    ))
}

async fn submit_mission_action(
    State(state): State<AppState>,
    Path((game_id, round_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<MissionActionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GameError> {
    let caller = Credentials::from_headers(&headers)?;
    let req = json_body(payload)?;
    let round =
        game_service::submit_mission_action(&state, &game_id, &round_id, &caller, req.action)
            .await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(200, "Action registered", round)),
    ))
}
