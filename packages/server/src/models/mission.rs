use serde::Serialize;

use super::{
    error::GameError,
    player::Player,
    round::{Round, RoundPhase, RoundResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionOutcome {
    Pending { received: usize, required: usize },
    Completed(RoundResult),
}

/// Records a group member's mission action (`true` = collaborate,
/// `false` = sabotage). A later submission from the same member replaces
/// the earlier one.
pub fn record_action(
    round: &mut Round,
    player: &Player,
    collaborate: bool,
) -> Result<MissionOutcome, GameError> {
    round.ensure_phase(RoundPhase::AwaitingMissionActions)?;

    if !round.in_group(&player.name) {
        return Err(GameError::NotInGroup(player.name.clone()));
    }
    if !collaborate && !player.role.may_sabotage() {
        return Err(GameError::RoleNotPermitted(player.name.clone()));
    }

    round.actions.insert(player.name.clone(), collaborate);
    Ok(outcome(round))
}

pub fn outcome(round: &Round) -> MissionOutcome {
    if round.actions.len() < round.group.len() {
        return MissionOutcome::Pending {
            received: round.actions.len(),
            required: round.group.len(),
        };
    }

    if round.actions.values().any(|collaborate| !collaborate) {
        MissionOutcome::Completed(RoundResult::Enemies)
    } else {
        MissionOutcome::Completed(RoundResult::Citizens)
    }
}
