use serde::Serialize;

use super::{
    error::GameError,
    round::{Round, RoundPhase},
    rule,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Pending { received: usize, required: usize },
    Approved,
    Rejected,
}

/// Records `voter`'s vote, overwriting any earlier one, and tallies once
/// every roster member has voted. The caller must already have checked that
/// `voter` is in the roster.
pub fn record_vote(
    round: &mut Round,
    roster_size: usize,
    voter: &str,
    approve: bool,
) -> Result<VoteOutcome, GameError> {
    round.ensure_phase(RoundPhase::AwaitingVotes)?;
    round.votes.insert(voter.to_string(), approve);
    Ok(tally(round, roster_size))
}

pub fn tally(round: &Round, roster_size: usize) -> VoteOutcome {
    if round.votes.len() < roster_size {
        return VoteOutcome::Pending {
            received: round.votes.len(),
            required: roster_size,
        };
    }

    let yes = round.votes.values().filter(|v| **v).count();
    if rule::is_approved(yes, roster_size) {
        VoteOutcome::Approved
    } else {
        VoteOutcome::Rejected
    }
}
