use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    error::GameError,
    mission::{self, MissionOutcome},
    player::Player,
    proposal,
    role::Role,
    role_assignment,
    round::{Round, RoundPhase, RoundResult, RoundView},
    rule::{self, RejectionPolicy, MAX_PLAYERS},
    score::{Faction, Score},
    vote::{self, VoteOutcome},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[serde(rename = "lobby")]
    Lobby,
    #[serde(rename = "rounds")]
    InProgress,
    #[serde(rename = "ended")]
    Ended,
}

impl GameStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "lobby" => Some(GameStatus::Lobby),
            "rounds" | "in-progress" => Some(GameStatus::InProgress),
            "ended" => Some(GameStatus::Ended),
            _ => None,
        }
    }
}

/// One game session: lobby roster, hidden roles, rounds and score.
///
/// All mutation goes through the methods below; a failed call leaves the
/// session untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub password_hash: Option<String>,
    pub players: Vec<Player>,
    pub enemies: Vec<String>,
    pub score: Score,
    pub rounds: Vec<Round>,
    pub current_round: Option<usize>,
    pub status: GameStatus,
    pub winner: Option<Faction>,
    pub rejection_policy: RejectionPolicy,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(
        id: String,
        name: String,
        owner: String,
        password_hash: Option<String>,
        rejection_policy: RejectionPolicy,
    ) -> Self {
        Game {
            id,
            name,
            players: vec![Player::new(owner.clone())],
            owner,
            password_hash,
            enemies: Vec::new(),
            score: Score::default(),
            rounds: Vec::new(),
            current_round: None,
            status: GameStatus::Lobby,
            winner: None,
            rejection_policy,
            version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn ensure_participant(&self, name: &str) -> Result<&Player, GameError> {
        self.player(name)
            .ok_or_else(|| GameError::Forbidden(name.to_string()))
    }

    pub fn is_enemy(&self, name: &str) -> bool {
        self.enemies.iter().any(|e| e == name)
    }

    pub fn add_player(&mut self, name: &str) -> Result<(), GameError> {
        if self.status != GameStatus::Lobby {
            return Err(GameError::invalid_phase("game has already started"));
        }
        if self.player(name).is_some() {
            return Err(GameError::PlayerAlreadyJoined(name.to_string()));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::GameFull);
        }
        self.players.push(Player::new(name));
        Ok(())
    }

    /// Fixes the enemy set. Only ever succeeds once per session.
    pub fn assign_roles<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if !self.enemies.is_empty() {
            return Err(GameError::AlreadyAssigned);
        }
        let enemies = role_assignment::assign_enemies(&self.players, rng)?;
        for player in &mut self.players {
            if enemies.contains(&player.name) {
                player.role = Role::Enemy;
            }
        }
        self.enemies = enemies;
        Ok(())
    }

    /// Assigns roles and opens the first round. The owner, who is always
    /// first in the roster, leads it.
    pub fn start<R: Rng + ?Sized>(&mut self, caller: &str, rng: &mut R) -> Result<(), GameError> {
        if self.status != GameStatus::Lobby {
            return Err(GameError::AlreadyAssigned);
        }
        self.ensure_participant(caller)?;
        if caller != self.owner {
            return Err(GameError::Unauthorized(format!(
                "Only the owner {} may start the game",
                self.owner
            )));
        }
        rule::ensure_roster_size(self.players.len())?;

        self.assign_roles(rng)?;
        self.status = GameStatus::InProgress;
        self.open_round(0);
        Ok(())
    }

    pub fn leader_for(&self, index: usize) -> &str {
        &self.players[index % self.players.len()].name
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current_round.and_then(|i| self.rounds.get(i))
    }

    pub fn round(&self, round_id: &str) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }

    /// The round a submission may mutate: it must exist and be the current
    /// one of a game still in progress.
    fn submission_target(&self, round_id: &str) -> Result<usize, GameError> {
        let position = self
            .rounds
            .iter()
            .position(|r| r.id == round_id)
            .ok_or_else(|| GameError::not_found(format!("Round {}", round_id)))?;

        if self.status != GameStatus::InProgress {
            return Err(GameError::invalid_phase("game is not in progress"));
        }
        if self.current_round != Some(position) {
            return Err(GameError::invalid_phase(format!(
                "round {} is not the current round",
                round_id
            )));
        }
        Ok(position)
    }

    pub fn propose_group(
        &mut self,
        round_id: &str,
        caller: &str,
        group: Vec<String>,
    ) -> Result<(), GameError> {
        self.ensure_participant(caller)?;
        let position = self.submission_target(round_id)?;
        proposal::validate_proposal(&self.players, &self.rounds[position], caller, &group)?;
        proposal::accept_proposal(&mut self.rounds[position], group);
        Ok(())
    }

    pub fn submit_vote(
        &mut self,
        round_id: &str,
        caller: &str,
        approve: bool,
    ) -> Result<VoteOutcome, GameError> {
        self.ensure_participant(caller)?;
        let position = self.submission_target(round_id)?;
        let roster_size = self.players.len();
        let round = &mut self.rounds[position];
        let outcome = vote::record_vote(round, roster_size, caller, approve)?;

        match outcome {
            VoteOutcome::Approved => round.phase = RoundPhase::AwaitingMissionActions,
            VoteOutcome::Rejected => {
                if self.rejection_policy.allows_another_proposal(round.proposals) {
                    round.reopen_for_proposal();
                } else {
                    self.finish_current_round(RoundResult::Enemies);
                }
            }
            VoteOutcome::Pending { .. } => {}
        }
        Ok(outcome)
    }

    pub fn submit_action(
        &mut self,
        round_id: &str,
        caller: &str,
        collaborate: bool,
    ) -> Result<MissionOutcome, GameError> {
        let player = self.ensure_participant(caller)?.clone();
        let position = self.submission_target(round_id)?;
        let outcome = mission::record_action(&mut self.rounds[position], &player, collaborate)?;

        if let MissionOutcome::Completed(result) = outcome {
            self.finish_current_round(result);
        }
        Ok(outcome)
    }

    fn open_round(&mut self, index: usize) {
        let leader = self.leader_for(index).to_string();
        self.rounds.push(Round::new(index, leader));
        self.current_round = Some(self.rounds.len() - 1);
    }

    /// Resolves the current round, scores it and either ends the game or
    /// opens the next round.
    fn finish_current_round(&mut self, result: RoundResult) {
        let Some(position) = self.current_round else {
            return;
        };
        self.rounds[position].resolve(result);
        self.score.record(result);

        match self.score.winner() {
            Some(winner) => {
                self.winner = Some(winner);
                self.status = GameStatus::Ended;
            }
            None => self.open_round(self.rounds[position].index + 1),
        }
    }

    pub fn round_views(&self) -> Vec<RoundView> {
        self.rounds.iter().map(|r| r.view(&self.players)).collect()
    }

    /// Lobby-level projection. Enemy identities are only revealed to
    /// enemies.
    pub fn view_for(&self, caller: Option<&str>) -> GameView {
        let reveal = caller.map(|c| self.is_enemy(c)).unwrap_or(false);
        GameView {
            id: self.id.clone(),
            name: self.name.clone(),
            owner: self.owner.clone(),
            status: self.status,
            password: self.has_password(),
            current_round: self.current_round().map(|r| r.id.clone()),
            players: self.players.iter().map(|p| p.name.clone()).collect(),
            enemies: if reveal { self.enemies.clone() } else { Vec::new() },
            score: self.score,
            winner: self.winner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub status: GameStatus,
    pub password: bool,
    pub current_round: Option<String>,
    pub players: Vec<String>,
    pub enemies: Vec<String>,
    pub score: Score,
    pub winner: Option<Faction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn lobby(n: usize, policy: RejectionPolicy) -> Game {
        let mut game = Game::new(
            "g1".to_string(),
            "test".to_string(),
            "p1".to_string(),
            None,
            policy,
        );
        for i in 2..=n {
            game.add_player(&format!("p{}", i)).unwrap();
        }
        game
    }

    fn started(n: usize, policy: RejectionPolicy) -> Game {
        let mut game = lobby(n, policy);
        game.start("p1", &mut StdRng::seed_from_u64(1)).unwrap();
        game
    }

    fn current_id(game: &Game) -> String {
        game.current_round().unwrap().id.clone()
    }

    /// Proposes the leader plus the next players in roster order and has
    /// everybody vote `approve`.
    fn propose_and_vote(game: &mut Game, approve: bool) {
        let round = game.current_round().unwrap().clone();
        let size = rule::required_group_size(game.players.len(), round.index).unwrap();
        let mut group = vec![round.leader.clone()];
        group.extend(
            game.players
                .iter()
                .map(|p| p.name.clone())
                .filter(|n| *n != round.leader)
                .take(size - 1),
        );
        game.propose_group(&round.id, &round.leader, group).unwrap();
        let voters: Vec<String> = game.players.iter().map(|p| p.name.clone()).collect();
        for voter in voters {
            game.submit_vote(&round.id, &voter, approve).unwrap();
        }
    }

    fn play_mission(game: &mut Game, citizens_win: bool) {
        propose_and_vote(game, true);
        let round = game.current_round().unwrap().clone();
        for member in &round.group {
            let collaborate = citizens_win || !game.is_enemy(member);
            game.submit_action(&round.id, member, collaborate).unwrap();
        }
    }

    /// A group that is guaranteed to contain an enemy.
    fn force_enemy_in_group(game: &mut Game) {
        let round = game.current_round().unwrap().clone();
        let size = rule::required_group_size(game.players.len(), round.index).unwrap();
        let enemy = game.enemies[0].clone();
        let mut group = vec![enemy.clone()];
        group.extend(
            game.players
                .iter()
                .map(|p| p.name.clone())
                .filter(|n| *n != enemy)
                .take(size - 1),
        );
        game.propose_group(&round.id, &round.leader, group).unwrap();
        let voters: Vec<String> = game.players.iter().map(|p| p.name.clone()).collect();
        for voter in voters {
            game.submit_vote(&round.id, &voter, true).unwrap();
        }
        let round = game.current_round().unwrap().clone();
        for member in &round.group {
            game.submit_action(&round.id, member, !game.is_enemy(member))
                .unwrap();
        }
    }

    #[test]
    fn test_start_assigns_roles_and_opens_round() {
        let game = started(7, RejectionPolicy::FailRound);
        assert_eq!(game.status, GameStatus::InProgress);
        assert_eq!(game.enemies.len(), 3);
        assert_eq!(game.players.iter().filter(|p| p.is_enemy()).count(), 3);
        let round = game.current_round().unwrap();
        assert_eq!(round.leader, "p1");
        assert_eq!(round.phase, RoundPhase::AwaitingProposal);
    }

    #[test]
    fn test_start_twice_fails() {
        let mut game = started(5, RejectionPolicy::FailRound);
        let result = game.start("p1", &mut StdRng::seed_from_u64(2));
        assert_eq!(result, Err(GameError::AlreadyAssigned));
        let result = game.assign_roles(&mut StdRng::seed_from_u64(2));
        assert_eq!(result, Err(GameError::AlreadyAssigned));
    }

    #[test]
    fn test_start_with_small_roster_fails_without_changes() {
        let mut game = lobby(4, RejectionPolicy::FailRound);
        let result = game.start("p1", &mut StdRng::seed_from_u64(2));
        assert_eq!(result, Err(GameError::InvalidRosterSize(4)));
        assert_eq!(game.status, GameStatus::Lobby);
        assert!(game.rounds.is_empty());
    }

    #[test]
    fn test_only_owner_starts() {
        let mut game = lobby(5, RejectionPolicy::FailRound);
        let result = game.start("p2", &mut StdRng::seed_from_u64(2));
        assert!(matches!(result, Err(GameError::Unauthorized(_))));
    }

    #[test]
    fn test_join_rules() {
        let mut game = lobby(10, RejectionPolicy::FailRound);
        assert_eq!(game.add_player("p3"), Err(GameError::PlayerAlreadyJoined("p3".into())));
        assert_eq!(game.add_player("p11"), Err(GameError::GameFull));
    }

    #[test]
    fn test_leader_rotation_wraps() {
        let mut game = started(5, RejectionPolicy::FailRound);
        // Every rejected vote ends the round, so the enemies win after
        // three rounds; check rotation along the way.
        for i in 0..3 {
            assert_eq!(game.current_round().unwrap().leader, format!("p{}", i + 1));
            propose_and_vote(&mut game, false);
        }
        assert_eq!(game.status, GameStatus::Ended);
        assert_eq!(game.leader_for(5), "p1");
        assert_eq!(game.leader_for(7), "p3");
    }

    #[test]
    fn test_rejected_vote_fails_round_for_enemies() {
        let mut game = started(7, RejectionPolicy::FailRound);
        let first = current_id(&game);
        propose_and_vote(&mut game, false);

        let resolved = game.round(&first).unwrap();
        assert_eq!(resolved.phase, RoundPhase::Resolved);
        assert_eq!(resolved.result, RoundResult::Enemies);
        assert!(resolved.actions.is_empty());
        assert_eq!(game.score, Score::new(0, 1));
        assert_eq!(game.current_round().unwrap().leader, "p2");
    }

    #[test]
    fn test_repropose_policy() {
        let mut game = started(5, RejectionPolicy::Repropose { max_proposals: 2 });
        let first = current_id(&game);

        propose_and_vote(&mut game, false);
        let round = game.current_round().unwrap();
        assert_eq!(round.id, first);
        assert_eq!(round.phase, RoundPhase::AwaitingProposal);
        assert_eq!(round.leader, "p1");
        assert_eq!(round.view(&game.players).phase, "vote2");
        assert!(round.group.is_empty());

        propose_and_vote(&mut game, false);
        assert_eq!(game.round(&first).unwrap().result, RoundResult::Enemies);
        assert_ne!(current_id(&game), first);
    }

    #[test]
    fn test_citizens_win_rounds_one_three_four() {
        let mut game = started(6, RejectionPolicy::FailRound);
        play_mission(&mut game, true);
        force_enemy_in_group(&mut game);
        play_mission(&mut game, true);
        assert_eq!(game.status, GameStatus::InProgress);
        play_mission(&mut game, true);

        assert_eq!(game.status, GameStatus::Ended);
        assert_eq!(game.winner, Some(Faction::Citizens));
        assert_eq!(game.score, Score::new(3, 1));
        assert_eq!(game.rounds.len(), 4);
    }

    #[test]
    fn test_submissions_after_resolution_rejected() {
        let mut game = started(5, RejectionPolicy::FailRound);
        let first = current_id(&game);
        play_mission(&mut game, true);
        let leader = game.round(&first).unwrap().group[0].clone();

        let before = game.score;
        assert!(matches!(
            game.submit_action(&first, &leader, true),
            Err(GameError::InvalidPhase(_))
        ));
        assert!(matches!(
            game.submit_vote(&first, "p2", true),
            Err(GameError::InvalidPhase(_))
        ));
        assert_eq!(game.score, before);
    }

    #[test]
    fn test_unknown_round_and_outsider() {
        let mut game = started(5, RejectionPolicy::FailRound);
        let id = current_id(&game);
        assert!(matches!(
            game.submit_vote("nope", "p1", true),
            Err(GameError::NotFound(_))
        ));
        assert_eq!(
            game.submit_vote(&id, "stranger", true),
            Err(GameError::Forbidden("stranger".into()))
        );
    }

    #[test]
    fn test_action_during_proposal_phase() {
        let mut game = started(5, RejectionPolicy::FailRound);
        let id = current_id(&game);
        assert!(matches!(
            game.submit_action(&id, "p1", true),
            Err(GameError::InvalidPhase(_))
        ));
    }

    #[test]
    fn test_enemies_only_visible_to_enemies() {
        let game = started(5, RejectionPolicy::FailRound);
        let enemy = game.enemies[0].clone();
        let citizen = game
            .players
            .iter()
            .find(|p| !p.is_enemy())
            .unwrap()
            .name
            .clone();
        assert_eq!(game.view_for(Some(&enemy)).enemies.len(), 2);
        assert!(game.view_for(Some(&citizen)).enemies.is_empty());
        assert!(game.view_for(None).enemies.is_empty());
    }
}
