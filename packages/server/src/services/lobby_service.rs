use tracing::info;

use crate::{
    models::{
        error::GameError,
        game::{Game, GameStatus, GameView},
        response::{CreateGameRequest, GameSearchQuery},
    },
    services::game_service::{check_password, mutate_game, read_game},
    state::AppState,
    utils::auth::{hash_password, Credentials},
};

const NAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=20;
const MAX_PAGE_SIZE: usize = 50;

fn validate_name(field: &str, value: &str) -> Result<(), GameError> {
    let length = value.trim().chars().count();
    if NAME_LENGTH.contains(&length) {
        Ok(())
    } else {
        Err(GameError::BadRequest(format!(
            "{} must be between {} and {} characters",
            field,
            NAME_LENGTH.start(),
            NAME_LENGTH.end()
        )))
    }
}

pub async fn create_game(state: &AppState, req: CreateGameRequest) -> Result<GameView, GameError> {
    validate_name("name", &req.name)?;
    validate_name("owner", &req.owner)?;

    let password_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(hash_password(password, state.config.password_hash_cost).await?),
        None => None,
    };

    let mut game = Game::new(
        uuid::Uuid::new_v4().to_string(),
        req.name.trim().to_string(),
        req.owner.trim().to_string(),
        password_hash,
        state.config.rejection_policy,
    );
    game.version = state
        .store
        .save(&game, 0)
        .map_err(|e| GameError::PersistenceFailure(e.to_string()))?;

    info!(game_id = %game.id, owner = %game.owner, "game created");
    let view = game.view_for(Some(&game.owner));
    state.insert_session(game).await;
    Ok(view)
}

/// Lists games from the store; no credentials needed and no roles shown.
/// Without a status filter only games still in the lobby are listed.
pub async fn list_games(state: &AppState, query: &GameSearchQuery) -> Result<Vec<GameView>, GameError> {
    let status = match query.status.as_deref() {
        Some(value) => GameStatus::parse(value)
            .ok_or_else(|| GameError::BadRequest(format!("unknown status {}", value)))?,
        None => GameStatus::Lobby,
    };
    let limit = query.limit.unwrap_or(MAX_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(GameError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    let page = query.page.unwrap_or(0);
    let name = query.name.as_deref().map(str::to_lowercase);

    let games = state
        .store
        .list()
        .map_err(|e| GameError::PersistenceFailure(e.to_string()))?;

    Ok(games
        .iter()
        .filter(|g| g.status == status)
        .filter(|g| {
            name.as_deref()
                .map(|n| g.name.to_lowercase().contains(n))
                .unwrap_or(true)
        })
        .skip(page.saturating_mul(limit))
        .take(limit)
        .map(|g| g.view_for(None))
        .collect())
}

pub async fn get_game(
    state: &AppState,
    game_id: &str,
    caller: &Credentials,
) -> Result<GameView, GameError> {
    check_password(state, game_id, caller).await?;
    read_game(state, game_id, |game| {
        game.ensure_participant(&caller.player)?;
        Ok(game.view_for(Some(&caller.player)))
    })
    .await
}

pub async fn join_game(
    state: &AppState,
    game_id: &str,
    caller: &Credentials,
) -> Result<GameView, GameError> {
    validate_name("player", &caller.player)?;
    check_password(state, game_id, caller).await?;
    let view = mutate_game(state, game_id, |game| {
        game.add_player(&caller.player)?;
        Ok(game.view_for(Some(&caller.player)))
    })
    .await?;

    info!(game_id, player = %caller.player, players = view.players.len(), "player joined");
    Ok(view)
}
