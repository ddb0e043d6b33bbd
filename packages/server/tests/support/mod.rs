#![allow(dead_code)]

use contaminados_server::{
    models::{
        game::Game,
        response::CreateGameRequest,
        round::RoundView,
        rule,
    },
    services::{game_service, lobby_service},
    state::AppState,
    utils::auth::Credentials,
};

pub fn player(i: usize) -> Credentials {
    Credentials::new(format!("player{}", i), None)
}

pub fn as_caller(name: &str) -> Credentials {
    Credentials::new(name, None)
}

/// Lobby with `n` players; `player1` owns it.
pub async fn setup_lobby(state: &AppState, n: usize) -> String {
    let view = lobby_service::create_game(
        state,
        CreateGameRequest {
            name: "test game".to_string(),
            owner: "player1".to_string(),
            password: None,
        },
    )
    .await
    .unwrap();
    for i in 2..=n {
        lobby_service::join_game(state, &view.id, &player(i))
            .await
            .unwrap();
    }
    view.id
}

/// Started game with `n` players; returns the game id and first round.
pub async fn setup_started_game(state: &AppState, n: usize) -> (String, RoundView) {
    let game_id = setup_lobby(state, n).await;
    let round = game_service::start_game(state, &game_id, &player(1))
        .await
        .unwrap();
    (game_id, round)
}

/// Full session state, roles included.
pub async fn game_state(state: &AppState, game_id: &str) -> Game {
    let session = state.session(game_id).await.unwrap();
    let game = session.lock().await.clone();
    game
}

/// A correctly sized group for the current round: citizens only, or the
/// first enemy plus citizens.
pub fn group_for(game: &Game, with_enemy: bool) -> Vec<String> {
    let round = game.current_round().unwrap();
    let size = rule::required_group_size(game.players.len(), round.index).unwrap();
    let mut group = Vec::new();
    if with_enemy {
        group.push(game.enemies[0].clone());
    }
    group.extend(
        game.players
            .iter()
            .filter(|p| !p.is_enemy())
            .map(|p| p.name.clone())
            .take(size - group.len()),
    );
    group
}

pub async fn propose_and_vote(
    state: &AppState,
    game_id: &str,
    group: Vec<String>,
    approve: bool,
) -> RoundView {
    let game = game_state(state, game_id).await;
    let round = game.current_round().unwrap().clone();
    game_service::propose_group(state, game_id, &round.id, &as_caller(&round.leader), group)
        .await
        .unwrap();

    let mut last = None;
    for p in &game.players {
        last = Some(
            game_service::submit_vote(state, game_id, &round.id, &as_caller(&p.name), approve)
                .await
                .unwrap(),
        );
    }
    last.unwrap()
}

/// Plays the current round to completion. With `with_enemy` the enemy in the
/// group sabotages and the enemies take the round.
pub async fn play_round(state: &AppState, game_id: &str, with_enemy: bool) -> RoundView {
    let game = game_state(state, game_id).await;
    let group = group_for(&game, with_enemy);
    let voted = propose_and_vote(state, game_id, group.clone(), true).await;

    let mut last = voted;
    for member in &group {
        let collaborate = !game.is_enemy(member);
        last = game_service::submit_mission_action(
            state,
            game_id,
            &last.id,
            &as_caller(member),
            collaborate,
        )
        .await
        .unwrap();
    }
    last
}
