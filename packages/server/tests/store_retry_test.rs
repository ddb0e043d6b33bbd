mod support;

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use contaminados_server::{
    models::{error::GameError, game::Game},
    services::{
        game_service,
        store::{GameStore, MemoryStore, StoreError},
    },
    state::AppState,
    utils::test_setup::{setup_test_env, test_config},
};
use support::{game_state, player, setup_started_game};

/// Reports a version conflict for the next `conflicts` saves.
#[derive(Default)]
struct ConflictingStore {
    inner: MemoryStore,
    conflicts: AtomicU32,
    saves: AtomicU32,
}

impl ConflictingStore {
    fn fail_next(&self, conflicts: u32) {
        self.conflicts.store(conflicts, Ordering::SeqCst);
        self.saves.store(0, Ordering::SeqCst);
    }
}

impl GameStore for ConflictingStore {
    fn load(&self, game_id: &str) -> Result<Option<Game>, StoreError> {
        self.inner.load(game_id)
    }

    fn save(&self, game: &Game, expected_version: u64) -> Result<u64, StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let pending = self.conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.conflicts.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict {
                expected: expected_version,
                actual: expected_version + 1,
            });
        }
        self.inner.save(game, expected_version)
    }

    fn list(&self) -> Result<Vec<Game>, StoreError> {
        self.inner.list()
    }
}

async fn proposed_game(store: Arc<ConflictingStore>) -> (AppState, String, String) {
    let state = AppState::with_store(store, test_config());
    let (game_id, round) = setup_started_game(&state, 5).await;
    game_service::propose_group(
        &state,
        &game_id,
        &round.id,
        &player(1),
        vec!["player1".to_string(), "player2".to_string()],
    )
    .await
    .unwrap();
    (state, game_id, round.id)
}

#[tokio::test]
async fn test_save_retried_after_conflict() {
    setup_test_env();
    let store = Arc::new(ConflictingStore::default());
    let (state, game_id, round_id) = proposed_game(store.clone()).await;

    store.fail_next(2);
    let view = game_service::submit_vote(&state, &game_id, &round_id, &player(2), true)
        .await
        .unwrap();
    assert_eq!(view.status, "voting");
    assert_eq!(store.saves.load(Ordering::SeqCst), 3);

    let stored = store.load(&game_id).unwrap().unwrap();
    assert_eq!(stored.rounds[0].votes.get("player2"), Some(&true));
}

#[tokio::test]
async fn test_save_gives_up_after_max_attempts() {
    setup_test_env();
    let store = Arc::new(ConflictingStore::default());
    let (state, game_id, round_id) = proposed_game(store.clone()).await;
    let before = store.load(&game_id).unwrap().unwrap().version;

    store.fail_next(3);
    let result = game_service::submit_vote(&state, &game_id, &round_id, &player(2), true).await;
    assert!(matches!(result, Err(GameError::PersistenceFailure(_))));
    assert_eq!(store.saves.load(Ordering::SeqCst), 3);

    let live = game_state(&state, &game_id).await;
    assert!(live.rounds[0].votes.is_empty());
    assert_eq!(live.version, before);

    // the session keeps working once the store recovers
    game_service::submit_vote(&state, &game_id, &round_id, &player(2), true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_retry_reapplies_on_top_of_concurrent_write() {
    setup_test_env();
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_store(store.clone(), test_config());
    let (game_id, round) = setup_started_game(&state, 5).await;
    game_service::propose_group(
        &state,
        &game_id,
        &round.id,
        &player(1),
        vec!["player1".to_string(), "player2".to_string()],
    )
    .await
    .unwrap();

    // another writer records a vote behind the session's back
    let mut other = store.load(&game_id).unwrap().unwrap();
    other.submit_vote(&round.id, "player4", false).unwrap();
    store.save(&other, other.version).unwrap();

    game_service::submit_vote(&state, &game_id, &round.id, &player(3), true)
        .await
        .unwrap();

    let live = game_state(&state, &game_id).await;
    let votes = &live.rounds[0].votes;
    assert_eq!(votes.get("player3"), Some(&true));
    assert_eq!(votes.get("player4"), Some(&false));
    assert_eq!(live.version, store.load(&game_id).unwrap().unwrap().version);
}
