use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::models::game::Game;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("version conflict: expected {expected}, stored {actual}")]
    Conflict { expected: u64, actual: u64 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of game sessions, written with optimistic version checks.
pub trait GameStore: Send + Sync {
    fn load(&self, game_id: &str) -> Result<Option<Game>, StoreError>;

    /// Stores `game` if the stored copy is still at `expected_version`
    /// (0 for a game never saved) and returns the new version.
    fn save(&self, game: &Game, expected_version: u64) -> Result<u64, StoreError>;

    fn list(&self) -> Result<Vec<Game>, StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<String, Game>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
        }
    }
}

impl GameStore for MemoryStore {
    fn load(&self, game_id: &str) -> Result<Option<Game>, StoreError> {
        let games = self
            .games
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(games.get(game_id).cloned())
    }

    fn save(&self, game: &Game, expected_version: u64) -> Result<u64, StoreError> {
        let mut games = self
            .games
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let actual = games.get(&game.id).map(|g| g.version).unwrap_or(0);
        if actual != expected_version {
            return Err(StoreError::Conflict {
                expected: expected_version,
                actual,
            });
        }

        let mut stored = game.clone();
        stored.version = expected_version + 1;
        games.insert(stored.id.clone(), stored);
        Ok(expected_version + 1)
    }

    fn list(&self) -> Result<Vec<Game>, StoreError> {
        let games = self
            .games
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let mut all: Vec<Game> = games.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }
}
