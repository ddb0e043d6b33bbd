use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::models::{config::GameConfig, error::GameError, game::Game};
use crate::services::store::{GameStore, MemoryStore};

/// One lock per game session; sessions never wait on each other.
pub type Session = Arc<Mutex<Game>>;

#[derive(Clone)]
pub struct AppState {
    pub games: Arc<RwLock<HashMap<String, Session>>>,
    pub channel: Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>,
    pub store: Arc<dyn GameStore>,
    pub config: Arc<GameConfig>,
    pub rng: Arc<Mutex<StdRng>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::from_env())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    pub fn with_store(store: Arc<dyn GameStore>, config: GameConfig) -> Self {
        let rng = match config.role_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        AppState {
            games: Arc::new(RwLock::new(HashMap::new())),
            channel: Arc::new(Mutex::new(HashMap::new())),
            store,
            config: Arc::new(config),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Live session for `game_id`, loaded from the store on first use.
    pub async fn session(&self, game_id: &str) -> Result<Session, GameError> {
        if let Some(session) = self.games.read().await.get(game_id) {
            return Ok(session.clone());
        }

        let stored = self
            .store
            .load(game_id)
            .map_err(|e| GameError::PersistenceFailure(e.to_string()))?
            .ok_or_else(|| GameError::not_found(format!("Game {}", game_id)))?;

        let mut games = self.games.write().await;
        Ok(games
            .entry(game_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(stored)))
            .clone())
    }

    pub async fn insert_session(&self, game: Game) -> Session {
        let session = Arc::new(Mutex::new(game.clone()));
        self.games.write().await.insert(game.id, session.clone());
        session
    }

    pub async fn get_or_create_game_channel(&self, game_id: &str) -> broadcast::Sender<String> {
        let mut channels = self.channel.lock().await;
        if let Some(channel) = channels.get(game_id) {
            channel.clone()
        } else {
            let (tx, _) = broadcast::channel(1000);
            channels.insert(game_id.to_string(), tx.clone());
            tx
        }
    }

    pub async fn broadcast_round_update(&self, update: &RoundUpdate) -> Result<(), String> {
        let tx = self.get_or_create_game_channel(&update.game_id).await;
        let message_text = serde_json::to_string(update)
            .map_err(|e| format!("Failed to encode round update: {}", e))?;

        // Nobody listening is not an error.
        if tx.send(message_text).is_err() {
            tracing::debug!(game_id = %update.game_id, "no subscribers for round update");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundUpdate {
    pub message_type: &'static str,
    pub game_id: String,
    pub round_id: String,
    /// Stored game version this update was committed at.
    pub version: u64,
    pub from_status: String,
    pub to_status: String,
    pub result: crate::models::round::RoundResult,
    pub current_round: Option<String>,
    pub winner: Option<crate::models::score::Faction>,
    pub timestamp: String,
}
