use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, head, post},
    Json, Router,
};

use super::json_body;
use crate::{
    models::{
        error::GameError,
        response::{ApiResponse, CreateGameRequest, GameSearchQuery, JoinGameRequest},
    },
    services::{game_service, lobby_service},
    state::AppState,
    utils::{auth::Credentials, websocket},
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        // curl -X POST http://localhost:8080/api/games -d '{"name":"..","owner":".."}'
        .route("/", post(create_game).get(list_games))
        // curl -H 'player: alice' http://localhost:8080/api/games/{gameId}
        .route("/:game_id", get(get_game).put(join_game))
        // curl -I -H 'player: alice' http://localhost:8080/api/games/{gameId}/start
        .route("/:game_id/start", head(start_game))
        // websocat ws://localhost:8080/api/games/{gameId}/ws
        .route("/:game_id/ws", get(websocket::handler))
        .with_state(state)
}

pub async fn create_game(
    State(state): State<AppState>,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GameError> {
    let req = json_body(payload)?;
    let game = lobby_service::create_game(&state, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, "Game Created", game)),
    ))
}

async fn list_games(
    State(state): State<AppState>,
    query: Result<Query<GameSearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GameError> {
    let Query(query) = query.map_err(|rejection| GameError::BadRequest(rejection.body_text()))?;
    let games = lobby_service::list_games(&state, &query).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(200, "Games Retrieved", games)),
    ))
}

async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GameError> {
    let caller = Credentials::from_headers(&headers)?;
    let game = lobby_service::get_game(&state, &game_id, &caller).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(200, "Game Retrieved", game)),
    ))
}

pub async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<JoinGameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GameError> {
    let caller = Credentials::from_headers(&headers)?;
    let req = json_body(payload)?;
    if req.player != caller.player {
        return Err(GameError::BadRequest(
            "Player name in the header and body must be the same".to_string(),
        ));
    }
    let game = lobby_service::join_game(&state, &game_id, &caller).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(200, "Player joined successfully", game)),
    ))
}

async fn start_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GameError> {
    let caller = Credentials::from_headers(&headers)?;
    game_service::start_game(&state, &game_id, &caller).await?;
    Ok((StatusCode::OK, [("x-msg", "Round created successfully.")]))
}
