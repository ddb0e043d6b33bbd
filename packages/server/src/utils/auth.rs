use axum::http::HeaderMap;

use crate::models::error::GameError;

/// Caller identity as sent in the `player` and `password` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub player: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(player: impl Into<String>, password: Option<&str>) -> Self {
        Self {
            player: player.into(),
            password: password.map(str::to_string),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, GameError> {
        let player = header_value(headers, "player")?
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| GameError::BadRequest("missing player header".to_string()))?;
        let password = header_value(headers, "password")?.filter(|p| !p.is_empty());
        Ok(Self { player, password })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, GameError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| GameError::BadRequest(format!("{} header is not valid text", name)))
        })
        .transpose()
}

/// Hashes on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, GameError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| GameError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| GameError::BadRequest(format!("unusable password: {}", e)))
}

/// Checks `supplied` against a game's stored hash on the blocking pool.
/// Games without a password accept anything.
pub async fn verify_password(
    stored: Option<String>,
    supplied: Option<String>,
) -> Result<(), GameError> {
    let Some(hash) = stored else {
        return Ok(());
    };
    let Some(password) = supplied else {
        return Err(GameError::InvalidCredentials);
    };

    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| GameError::Internal(format!("password check task failed: {}", e)))?;
    if matches {
        Ok(())
    } else {
        Err(GameError::InvalidCredentials)
    }
}
