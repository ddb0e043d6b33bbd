use serde::{Deserialize, Serialize};

/// Envelope every successful response is wrapped in.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub msg: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, msg: impl Into<String>, data: T) -> Self {
        Self {
            status,
            msg: msg.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub msg: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub name: String,
    pub owner: String,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinGameRequest {
    pub player: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GameSearchQuery {
    pub name: Option<String>,
    pub status: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposeGroupRequest {
    pub group: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub vote: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MissionActionRequest {
    pub action: bool,
}
