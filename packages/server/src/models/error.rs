use thiserror::Error;

/// Every way a lobby or round operation can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid number of players ({0}). Game must have between 5 and 10 players.")]
    InvalidRosterSize(usize),
    #[error("Roles have already been assigned")]
    AlreadyAssigned,
    #[error("{0}")]
    Unauthorized(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Action not permitted in current phase: {0}")]
    InvalidPhase(String),
    #[error("Group must have {expected} members, got {actual}")]
    InvalidGroupSize { expected: usize, actual: usize },
    #[error("Invalid group member: {0}")]
    InvalidGroupMember(String),
    #[error("Player {0} is not part of the mission group")]
    NotInGroup(String),
    #[error("Player {0} is not allowed to sabotage")]
    RoleNotPermitted(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Player {0} is not part of the game")]
    Forbidden(String),
    #[error("Player {0} is already in the game")]
    PlayerAlreadyJoined(String),
    #[error("Game is full")]
    GameFull,
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Timed out waiting for game {0}")]
    Timeout(String),
    #[error("Unable to save game: {0}")]
    PersistenceFailure(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn invalid_phase(detail: impl Into<String>) -> Self {
        Self::InvalidPhase(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }
}
