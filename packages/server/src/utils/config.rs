use once_cell::sync::Lazy;
use std::{env, net::SocketAddr};

pub static CONFIG: Lazy<Config> = Lazy::new(Config::new);

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

pub struct Config {
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
}

impl Config {
    fn new() -> Self {
        let bind_addr = env::var("SERVER_ADDR")
            .ok()
            .and_then(|addr| match addr.parse() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    tracing::warn!(%addr, "invalid SERVER_ADDR, using {}", DEFAULT_ADDR);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            bind_addr,
            cors_origins,
        }
    }
}
