use dotenvy::dotenv;
use std::sync::Once;

use crate::models::config::GameConfig;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // Defaults for when no .env file is present
        if std::env::var("GAME_PASSWORD_HASH_COST").is_err() {
            std::env::set_var("GAME_PASSWORD_HASH_COST", "4");
        }
        if std::env::var("GAME_ROLE_SEED").is_err() {
            std::env::set_var("GAME_ROLE_SEED", "42");
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("contaminados_server=debug"))
            .with_test_writer()
            .try_init();
    });
}

/// Cheap hashing and a fixed role seed.
pub fn test_config() -> GameConfig {
    GameConfig {
        role_seed: Some(42),
        password_hash_cost: 4,
        ..GameConfig::default()
    }
}
