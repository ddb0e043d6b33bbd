use std::{env, time::Duration};

use super::rule::RejectionPolicy;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rejection_policy: RejectionPolicy,
    /// Save attempts before a conflicting write is reported as permanent.
    pub persist_max_attempts: u32,
    /// How long a request waits for a busy game session.
    pub lock_timeout: Duration,
    // Fixed seed makes role assignment reproducible
    pub role_seed: Option<u64>,
    pub password_hash_cost: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rejection_policy: RejectionPolicy::FailRound,
            persist_max_attempts: 3,
            lock_timeout: Duration::from_millis(5000),
            role_seed: None,
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let rejection_policy = match env::var("GAME_REJECTION_POLICY") {
            Ok(value) => RejectionPolicy::parse(&value).unwrap_or_else(|| {
                tracing::warn!(%value, "unknown GAME_REJECTION_POLICY, using fail-round");
                defaults.rejection_policy
            }),
            Err(_) => defaults.rejection_policy,
        };
        let persist_max_attempts = parse_var("GAME_PERSIST_MAX_ATTEMPTS")
            .filter(|n: &u32| *n > 0)
            .unwrap_or(defaults.persist_max_attempts);
        let lock_timeout = parse_var("GAME_LOCK_TIMEOUT_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.lock_timeout);
        let role_seed = parse_var("GAME_ROLE_SEED");
        let password_hash_cost = parse_var("GAME_PASSWORD_HASH_COST")
            .filter(|cost: &u32| (4..=31).contains(cost))
            .unwrap_or(defaults.password_hash_cost);

        Self {
            rejection_policy,
            persist_max_attempts,
            lock_timeout,
            role_seed,
            password_hash_cost,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(var = name, %value, "ignoring unparsable setting");
            None
        }
    }
}
