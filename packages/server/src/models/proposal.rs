use std::collections::HashSet;

use super::{
    error::GameError,
    player::Player,
    round::{Round, RoundPhase},
    rule,
};

/// Checks a leader's proposed mission group against the round it targets.
///
/// Order of checks: phase, leader, group size, then membership. Nothing is
/// mutated here; see [`accept_proposal`].
pub fn validate_proposal(
    roster: &[Player],
    round: &Round,
    caller: &str,
    group: &[String],
) -> Result<(), GameError> {
    round.ensure_phase(RoundPhase::AwaitingProposal)?;

    if round.leader != caller {
        return Err(GameError::Unauthorized(format!(
            "Only the leader {} may propose a group",
            round.leader
        )));
    }

    let expected = rule::required_group_size(roster.len(), round.index)?;
    if group.len() != expected {
        return Err(GameError::InvalidGroupSize {
            expected,
            actual: group.len(),
        });
    }

    let mut seen = HashSet::with_capacity(group.len());
    for member in group {
        if !roster.iter().any(|p| &p.name == member) {
            return Err(GameError::InvalidGroupMember(format!(
                "{} is not in the game",
                member
            )));
        }
        if !seen.insert(member.as_str()) {
            return Err(GameError::InvalidGroupMember(format!(
                "{} appears more than once",
                member
            )));
        }
    }

    Ok(())
}

/// Stores a validated group and opens the vote.
pub fn accept_proposal(round: &mut Round, group: Vec<String>) {
    round.group = group;
    round.votes.clear();
    round.actions.clear();
    round.proposals = round.proposals.saturating_add(1);
    round.phase = RoundPhase::AwaitingVotes;
}
