use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::{
    models::{
        error::GameError,
        game::{Game, GameStatus},
        round::RoundView,
        score::Faction,
    },
    services::store::StoreError,
    state::{AppState, RoundUpdate, Session},
    utils::auth::{verify_password, Credentials},
};

async fn lock_session(
    state: &AppState,
    session: Session,
    game_id: &str,
) -> Result<OwnedMutexGuard<Game>, GameError> {
    tokio::time::timeout(state.config.lock_timeout, session.lock_owned())
        .await
        .map_err(|_| GameError::Timeout(game_id.to_string()))
}

/// Runs `op` against the session under its lock and persists the result.
/// The lock is handed back along with `op`'s output, still held and
/// guarding the committed game.
///
/// `op` works on a copy, so a rejected operation leaves the session as it
/// was. A version conflict on save reloads the stored session and applies
/// `op` again, up to `persist_max_attempts` times.
async fn commit<T, F>(
    state: &AppState,
    game_id: &str,
    mut op: F,
) -> Result<(T, OwnedMutexGuard<Game>), GameError>
where
    F: FnMut(&mut Game) -> Result<T, GameError>,
{
    let session = state.session(game_id).await?;
    let mut live = lock_session(state, session, game_id).await?;
    let max_attempts = state.config.persist_max_attempts.max(1);

    let mut base = live.clone();
    let mut attempt = 1;
    loop {
        let mut candidate = base.clone();
        let output = match op(&mut candidate) {
            Ok(output) => output,
            Err(e) => {
                if attempt > 1 {
                    *live = base;
                }
                return Err(e);
            }
        };

        match state.store.save(&candidate, base.version) {
            Ok(version) => {
                candidate.version = version;
                *live = candidate;
                return Ok((output, live));
            }
            Err(StoreError::Conflict { expected, actual }) if attempt < max_attempts => {
                warn!(
                    game_id,
                    expected, actual, attempt, "concurrent update on save, retrying"
                );
                base = state
                    .store
                    .load(game_id)
                    .map_err(|e| GameError::PersistenceFailure(e.to_string()))?
                    .ok_or_else(|| GameError::not_found(format!("Game {}", game_id)))?;
                attempt += 1;
            }
            Err(e) => {
                warn!(game_id, attempt, error = %e, "giving up on save");
                return Err(GameError::PersistenceFailure(format!(
                    "Unable to save the game after {} attempts: {}",
                    attempt, e
                )));
            }
        }
    }
}

/// [`commit`] without keeping the lock.
pub async fn mutate_game<T, F>(state: &AppState, game_id: &str, op: F) -> Result<T, GameError>
where
    F: FnMut(&mut Game) -> Result<T, GameError>,
{
    commit(state, game_id, op).await.map(|(output, _)| output)
}

/// Read-only access under the session lock.
pub(crate) async fn read_game<T>(
    state: &AppState,
    game_id: &str,
    op: impl FnOnce(&Game) -> Result<T, GameError>,
) -> Result<T, GameError> {
    let session = state.session(game_id).await?;
    let game = lock_session(state, session, game_id).await?;
    op(&game)
}

/// Checks the caller's game password. The stored hash is copied out under
/// the lock; bcrypt runs after it is released.
pub(crate) async fn check_password(
    state: &AppState,
    game_id: &str,
    caller: &Credentials,
) -> Result<(), GameError> {
    let stored = read_game(state, game_id, |game| Ok(game.password_hash.clone())).await?;
    verify_password(stored, caller.password.clone()).await
}

fn round_view(game: &Game, round_id: &str) -> Result<RoundView, GameError> {
    game.round(round_id)
        .map(|r| r.view(&game.players))
        .ok_or_else(|| GameError::not_found(format!("Round {}", round_id)))
}

/// What a submission did to its round, for the response and the push
/// notification.
struct Submission {
    round: RoundView,
    from_status: String,
    current_round: Option<String>,
    status: GameStatus,
    winner: Option<Faction>,
}

async fn submit(
    state: &AppState,
    game_id: &str,
    round_id: &str,
    caller: &Credentials,
    mut apply: impl FnMut(&mut Game) -> Result<(), GameError>,
) -> Result<RoundView, GameError> {
    check_password(state, game_id, caller).await?;
    let (submission, game) = commit(state, game_id, |game| {
        game.ensure_participant(&caller.player)?;
        let from_status = game
            .round(round_id)
            .map(|r| r.phase.status().to_string())
            .unwrap_or_default();
        apply(game)?;
        Ok(Submission {
            round: round_view(game, round_id)?,
            from_status,
            current_round: game.current_round().map(|r| r.id.clone()),
            status: game.status,
            winner: game.winner,
        })
    })
    .await?;

    debug!(
        game_id,
        round_id,
        player = %caller.player,
        status = %submission.round.status,
        version = game.version,
        "submission accepted"
    );

    if submission.from_status != submission.round.status {
        info!(
            game_id,
            round_id,
            from = %submission.from_status,
            to = %submission.round.status,
            "round transition"
        );
        if submission.status == GameStatus::Ended {
            info!(game_id, winner = ?submission.winner, "game ended");
        }
    }

    // Pushed while the session is still locked, so updates leave in commit order.
    let update = RoundUpdate {
        message_type: "round_update",
        game_id: game_id.to_string(),
        round_id: round_id.to_string(),
        version: game.version,
        from_status: submission.from_status.clone(),
        to_status: submission.round.status.clone(),
        result: submission.round.result,
        current_round: submission.current_round.clone(),
        winner: submission.winner,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    if let Err(e) = state.broadcast_round_update(&update).await {
        warn!(game_id, error = %e, "failed to push round update");
    }
    drop(game);

    Ok(submission.round)
}

/// Assigns roles and opens the first round (StartRound).
pub async fn start_game(
    state: &AppState,
    game_id: &str,
    caller: &Credentials,
) -> Result<RoundView, GameError> {
    check_password(state, game_id, caller).await?;
    // The shared rng only hands out a seed; no game lock is awaited while it is held.
    let seed: u64 = state.rng.lock().await.gen();

    let (round, game) = commit(state, game_id, |game| {
        let mut rng = StdRng::seed_from_u64(seed);
        game.start(&caller.player, &mut rng)?;
        game.current_round()
            .map(|r| r.view(&game.players))
            .ok_or_else(|| GameError::invalid_phase("no round was opened"))
    })
    .await?;

    info!(game_id, round_id = %round.id, leader = %round.leader, "game started");
    let update = RoundUpdate {
        message_type: "round_update",
        game_id: game_id.to_string(),
        round_id: round.id.clone(),
        version: game.version,
        from_status: String::new(),
        to_status: round.status.clone(),
        result: round.result,
        current_round: Some(round.id.clone()),
        winner: None,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    if let Err(e) = state.broadcast_round_update(&update).await {
        warn!(game_id, error = %e, "failed to push round update");
    }
    drop(game);

    Ok(round)
}

pub async fn get_rounds(
    state: &AppState,
    game_id: &str,
    caller: &Credentials,
) -> Result<Vec<RoundView>, GameError> {
    check_password(state, game_id, caller).await?;
    read_game(state, game_id, |game| {
        game.ensure_participant(&caller.player)?;
        Ok(game.round_views())
    })
    .await
}

pub async fn get_round(
    state: &AppState,
    game_id: &str,
    round_id: &str,
    caller: &Credentials,
) -> Result<RoundView, GameError> {
    check_password(state, game_id, caller).await?;
    read_game(state, game_id, |game| {
        game.ensure_participant(&caller.player)?;
        round_view(game, round_id)
    })
    .await
}

pub async fn propose_group(
    state: &AppState,
    game_id: &str,
    round_id: &str,
    caller: &Credentials,
    group: Vec<String>,
) -> Result<RoundView, GameError> {
    submit(state, game_id, round_id, caller, |game| {
        game.propose_group(round_id, &caller.player, group.clone())
    })
    .await
}

pub async fn submit_vote(
    state: &AppState,
    game_id: &str,
    round_id: &str,
    caller: &Credentials,
    vote: bool,
) -> Result<RoundView, GameError> {
    submit(state, game_id, round_id, caller, |game| {
        game.submit_vote(round_id, &caller.player, vote).map(|_| ())
    })
    .await
}

pub async fn submit_mission_action(
    state: &AppState,
    game_id: &str,
    round_id: &str,
    caller: &Credentials,
    action: bool,
) -> Result<RoundView, GameError> {
    submit(state, game_id, round_id, caller, |game| {
        game.submit_action(round_id, &caller.player, action)
            .map(|_| ())
    })
    .await
}
