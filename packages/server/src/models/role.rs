use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Enemy,
}

impl Role {
    /// Citizens may only collaborate on a mission.
    pub fn may_sabotage(&self) -> bool {
        matches!(self, Role::Enemy)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Citizen => write!(f, "citizen"),
            Role::Enemy => write!(f, "enemy"),
        }
    }
}
