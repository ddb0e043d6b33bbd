use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{error::GameError, player::Player};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    AwaitingProposal,
    AwaitingVotes,
    AwaitingMissionActions,
    Resolved,
}

impl RoundPhase {
    /// Wire name used in round snapshots.
    pub fn status(&self) -> &'static str {
        match self {
            RoundPhase::AwaitingProposal => "waiting-on-leader",
            RoundPhase::AwaitingVotes => "voting",
            RoundPhase::AwaitingMissionActions => "waiting-on-group",
            RoundPhase::Resolved => "ended",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    None,
    Citizens,
    Enemies,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Round {
    pub id: String,
    pub index: usize,
    pub leader: String,
    pub phase: RoundPhase,
    pub group: Vec<String>,
    pub votes: BTreeMap<String, bool>,
    pub actions: BTreeMap<String, bool>,
    pub result: RoundResult,
    /// Proposals made so far in this round, including the pending one.
    pub proposals: u8,
    pub created_at: DateTime<Utc>,
}

impl Round {
    pub fn new(index: usize, leader: String) -> Self {
        Round {
            id: uuid::Uuid::new_v4().to_string(),
            index,
            leader,
            phase: RoundPhase::AwaitingProposal,
            group: Vec::new(),
            votes: BTreeMap::new(),
            actions: BTreeMap::new(),
            result: RoundResult::None,
            proposals: 0,
            created_at: Utc::now(),
        }
    }

    pub fn ensure_phase(&self, expected: RoundPhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::invalid_phase(format!(
                "round {} is {}, expected {}",
                self.index,
                self.phase.status(),
                expected.status()
            )))
        }
    }

    pub fn in_group(&self, name: &str) -> bool {
        self.group.iter().any(|member| member == name)
    }

    /// Sends the round back to its leader with a clean slate.
    pub fn reopen_for_proposal(&mut self) {
        self.group.clear();
        self.votes.clear();
        self.actions.clear();
        self.phase = RoundPhase::AwaitingProposal;
    }

    pub fn resolve(&mut self, result: RoundResult) {
        self.result = result;
        self.phase = RoundPhase::Resolved;
    }

    /// 1-based proposal attempt the round is on.
    pub fn attempt(&self) -> u8 {
        match self.phase {
            RoundPhase::AwaitingProposal => self.proposals.saturating_add(1),
            _ => self.proposals.max(1),
        }
    }

    /// Public projection; mission actions stay secret, votes are listed in
    /// roster order.
    pub fn view(&self, roster: &[Player]) -> RoundView {
        RoundView {
            id: self.id.clone(),
            leader: self.leader.clone(),
            status: self.phase.status().to_string(),
            phase: format!("vote{}", self.attempt()),
            result: self.result,
            group: self.group.clone(),
            votes: roster
                .iter()
                .filter_map(|player| self.votes.get(&player.name).copied())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundView {
    pub id: String,
    pub leader: String,
    pub status: String,
    pub phase: String,
    pub result: RoundResult,
    pub group: Vec<String>,
    pub votes: Vec<bool>,
}
