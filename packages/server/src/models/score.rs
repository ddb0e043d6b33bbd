use serde::{Deserialize, Serialize};

use super::{
    round::RoundResult,
    rule::{MAX_ROUNDS, WINS_TO_END},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Citizens,
    Enemies,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub citizen_wins: u8,
    pub enemy_wins: u8,
}

impl Score {
    pub fn new(citizen_wins: u8, enemy_wins: u8) -> Self {
        Score {
            citizen_wins,
            enemy_wins,
        }
    }

    pub fn record(&mut self, result: RoundResult) {
        match result {
            RoundResult::Citizens => self.citizen_wins += 1,
            RoundResult::Enemies => self.enemy_wins += 1,
            RoundResult::None => {}
        }
    }

    pub fn resolved_rounds(&self) -> usize {
        usize::from(self.citizen_wins) + usize::from(self.enemy_wins)
    }

    /// The winning side, once the game is over.
    pub fn winner(&self) -> Option<Faction> {
        if self.citizen_wins >= WINS_TO_END {
            return Some(Faction::Citizens);
        }
        if self.enemy_wins >= WINS_TO_END {
            return Some(Faction::Enemies);
        }
        // Unreachable with binary round results; kept so a game can never
        // outlive its last round.
        if self.resolved_rounds() >= MAX_ROUNDS {
            return Some(if self.citizen_wins > self.enemy_wins {
                Faction::Citizens
            } else {
                Faction::Enemies
            });
        }
        None
    }
}
