//! Game history from one player's side.
//!
//! Everything here is derived from authority snapshots; nothing is kept
//! locally beyond the session records.

use alloy_primitives::Address;
use rpsls_core::{GameId, GameResult, GameView, Phase};
use serde::{Deserialize, Serialize};

/// How a game ended for this player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    /// Nobody joined and player 1 took the stake back
    Refunded,
    Pending,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl HistoryFilter {
    pub fn matches(&self, record: &GameRecord) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Active => !record.phase.is_terminal(),
            HistoryFilter::Completed => record.phase.is_terminal(),
        }
    }
}

/// One game as seen by a participant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: GameId,
    pub role: crate::Role,
    /// `Address::ZERO` while nobody has joined
    pub opponent: Address,
    pub stake: u64,
    pub phase: Phase,
    pub outcome: Outcome,
    /// Net change to this player's balance once settled
    pub earnings: i64,
    pub last_action: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub net_earnings: i64,
}

impl GameRecord {
    /// `None` when `player` took no part in the game
    pub fn from_view(view: &GameView, player: Address) -> Option<Self> {
        let joined = view.player2 != Address::ZERO;
        let (role, opponent) = if view.player1 == player {
            (crate::Role::Player1, view.player2)
        } else if joined && view.player2 == player {
            (crate::Role::Player2, view.player1)
        } else {
            return None;
        };

        let outcome = match (view.phase, view.result, role) {
            (Phase::Resolved, Some(GameResult::Draw), _) => Outcome::Draw,
            (Phase::Resolved, Some(GameResult::AWins), crate::Role::Player1)
            | (Phase::Resolved, Some(GameResult::BWins), crate::Role::Player2) => Outcome::Win,
            (Phase::Resolved, Some(_), _) => Outcome::Loss,
            (Phase::TimedOut, _, _) if !joined => Outcome::Refunded,
            // A joined game only times out in player 2's favour.
            (Phase::TimedOut, _, crate::Role::Player2) => Outcome::Win,
            (Phase::TimedOut, _, _) => Outcome::Loss,
            _ => Outcome::Pending,
        };

        let stake = i64::try_from(view.stake).unwrap_or(i64::MAX);
        let earnings = match outcome {
            Outcome::Win => stake,
            Outcome::Loss => -stake,
            Outcome::Draw | Outcome::Refunded | Outcome::Pending => 0,
        };

        Some(Self {
            game_id: view.game_id,
            role,
            opponent,
            stake: view.stake,
            phase: view.phase,
            outcome,
            earnings,
            last_action: view.last_action,
        })
    }
}

impl HistorySummary {
    pub fn from_records(records: &[GameRecord]) -> Self {
        let count = |outcome: Outcome| records.iter().filter(|r| r.outcome == outcome).count();
        let completed = records.iter().filter(|r| r.phase.is_terminal()).count();

        Self {
            total: records.len(),
            active: records.len() - completed,
            completed,
            wins: count(Outcome::Win),
            losses: count(Outcome::Loss),
            draws: count(Outcome::Draw),
            net_earnings: records
                .iter()
                .fold(0i64, |sum, r| sum.saturating_add(r.earnings)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use rpsls_core::{Commitment, Move, Secret};

    fn p1() -> Address {
        Address::with_last_byte(1)
    }

    fn p2() -> Address {
        Address::with_last_byte(2)
    }

    fn view(phase: Phase, joined: bool, result: Option<GameResult>) -> GameView {
        GameView {
            game_id: GameId::new(),
            player1: p1(),
            player2: if joined { p2() } else { Address::ZERO },
            opponent: Some(p2()),
            commitment: Commitment::new(Move::Rock, &Secret::random()),
            stake: 5,
            player2_move: if joined { 3 } else { 0 },
            last_action: 1_000,
            timeout_window_secs: 300,
            phase,
            result,
        }
    }

    #[test]
    fn test_resolved_game_from_both_sides() {
        let game = view(Phase::Resolved, true, Some(GameResult::AWins));

        let mine = GameRecord::from_view(&game, p1()).unwrap();
        assert_eq!(mine.role, Role::Player1);
        assert_eq!(mine.opponent, p2());
        assert_eq!(mine.outcome, Outcome::Win);
        assert_eq!(mine.earnings, 5);

        let theirs = GameRecord::from_view(&game, p2()).unwrap();
        assert_eq!(theirs.outcome, Outcome::Loss);
        assert_eq!(theirs.earnings, -5);

        assert!(GameRecord::from_view(&game, Address::with_last_byte(3)).is_none());
    }

    #[test]
    fn test_timeouts() {
        let refunded = view(Phase::TimedOut, false, None);
        let record = GameRecord::from_view(&refunded, p1()).unwrap();
        assert_eq!(record.outcome, Outcome::Refunded);
        assert_eq!(record.earnings, 0);
        // The named opponent never joined, so it is not their game.
        assert!(GameRecord::from_view(&refunded, p2()).is_none());

        let forfeited = view(Phase::TimedOut, true, None);
        assert_eq!(
            GameRecord::from_view(&forfeited, p2()).unwrap().outcome,
            Outcome::Win
        );
        assert_eq!(
            GameRecord::from_view(&forfeited, p1()).unwrap().earnings,
            -5
        );
    }

    #[test]
    fn test_summary_and_filters() {
        let records: Vec<GameRecord> = [
            view(Phase::Resolved, true, Some(GameResult::AWins)),
            view(Phase::Resolved, true, Some(GameResult::Draw)),
            view(Phase::Resolved, true, Some(GameResult::BWins)),
            view(Phase::TimedOut, true, None),
            view(Phase::Joined, true, None),
            view(Phase::Created, false, None),
        ]
        .iter()
        .filter_map(|game| GameRecord::from_view(game, p1()))
        .collect();

        let summary = HistorySummary::from_records(&records);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.completed, 4);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 2);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.net_earnings, -5);

        let active: Vec<_> = records
            .iter()
            .filter(|r| HistoryFilter::Active.matches(r))
            .collect();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|r| r.outcome == Outcome::Pending));
    }
}
