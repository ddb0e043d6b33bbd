use rand::{seq::SliceRandom, Rng};

use super::{error::GameError, player::Player, rule};

/// Picks `enemy_count(N)` distinct players uniformly at random. Returned
/// names keep roster order.
pub fn assign_enemies<R: Rng + ?Sized>(
    roster: &[Player],
    rng: &mut R,
) -> Result<Vec<String>, GameError> {
    let count = rule::enemy_count(roster.len())?;
    let chosen: Vec<&str> = roster
        .choose_multiple(rng, count)
        .map(|p| p.name.as_str())
        .collect();

    Ok(roster
        .iter()
        .filter(|p| chosen.contains(&p.name.as_str()))
        .map(|p| p.name.clone())
        .collect())
}
