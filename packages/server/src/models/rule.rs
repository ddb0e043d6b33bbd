use serde::{Deserialize, Serialize};

use super::error::GameError;

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 10;
/// Best of five: the first side to three round wins takes the game.
pub const WINS_TO_END: u8 = 3;
pub const MAX_ROUNDS: usize = 5;

// Rows are roster sizes 5..=10, columns round indices 0..=4.
const GROUP_SIZES: [[usize; MAX_ROUNDS]; MAX_PLAYERS - MIN_PLAYERS + 1] = [
    [2, 3, 2, 3, 3],
    [2, 3, 4, 3, 4],
    [2, 3, 3, 4, 4],
    [3, 4, 4, 5, 5],
    [3, 4, 4, 5, 5],
    [3, 4, 4, 5, 5],
];

pub fn ensure_roster_size(players: usize) -> Result<(), GameError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
        Ok(())
    } else {
        Err(GameError::InvalidRosterSize(players))
    }
}

pub fn enemy_count(players: usize) -> Result<usize, GameError> {
    match players {
        5 | 6 => Ok(2),
        7..=9 => Ok(3),
        10 => Ok(4),
        _ => Err(GameError::InvalidRosterSize(players)),
    }
}

pub fn required_group_size(players: usize, round_index: usize) -> Result<usize, GameError> {
    ensure_roster_size(players)?;
    GROUP_SIZES[players - MIN_PLAYERS]
        .get(round_index)
        .copied()
        .ok_or_else(|| GameError::invalid_phase(format!("round {} is past the last round", round_index)))
}

/// Strict majority; ties reject.
pub fn is_approved(yes_votes: usize, players: usize) -> bool {
    yes_votes * 2 > players
}

/// What happens to a round whose proposed group the table voted down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum RejectionPolicy {
    /// The round ends as an enemy win without a mission being played.
    #[default]
    FailRound,
    /// The leader proposes again; the round fails once `max_proposals`
    /// proposals have been rejected.
    Repropose { max_proposals: u8 },
}

impl RejectionPolicy {
    /// Parses `fail-round` or `repropose:<n>`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "fail-round" => Some(RejectionPolicy::FailRound),
            other => {
                let max = other.strip_prefix("repropose:")?.parse::<u8>().ok()?;
                (max > 0).then_some(RejectionPolicy::Repropose { max_proposals: max })
            }
        }
    }

    /// Whether the round may go back to the leader after its `proposals`-th
    /// proposal was rejected.
    pub fn allows_another_proposal(&self, proposals: u8) -> bool {
        match self {
            RejectionPolicy::FailRound => false,
            RejectionPolicy::Repropose { max_proposals } => proposals < *max_proposals,
        }
    }
}
