//! Game state machine.
//!
//! ```text
//! Created ──join──▶ Joined ──reveal──▶ Resolved
//!    │                 │
//!    └─player1_timeout └─player2_timeout──▶ TimedOut
//! ```
//!
//! Each transition validates every precondition before touching any field,
//! so a rejected call leaves the game exactly as it was. Fund movement is
//! described by the returned transfers; the caller (the ledger authority)
//! applies them.

use super::error::GameError;
use super::types::{GameId, GameResult, GameView, Operation, Phase, Transfer};
use crate::config::ProtocolConfig;
use crate::crypto::{Commitment, Secret};
use crate::games::{Move, RpslsGame};
use crate::timeout;
use alloy_primitives::Address;
use std::time::Duration;

/// A single game instance, exclusively owned by the authority
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    id: GameId,
    player1: Address,
    player2: Address,
    opponent: Option<Address>,
    commitment: Commitment,
    stake: u64,
    player2_move: Option<Move>,
    last_action: u64,
    phase: Phase,
    result: Option<GameResult>,
}

impl Game {
    /// Open a new game with player 1's commitment and stake.
    ///
    /// An opponent of `Address::ZERO` is treated as unspecified.
    pub fn create(
        id: GameId,
        caller: Address,
        opponent: Option<Address>,
        commitment: Commitment,
        stake: u64,
        now: u64,
        config: &ProtocolConfig,
    ) -> Result<Self, GameError> {
        if caller == Address::ZERO {
            return Err(GameError::NotParticipant);
        }
        if stake == 0 {
            return Err(GameError::InvalidStake("stake must be positive".to_string()));
        }
        if stake.checked_mul(2).is_none() {
            return Err(GameError::InvalidStake("pot would overflow".to_string()));
        }
        if commitment.is_zero() {
            return Err(GameError::MalformedCommitment);
        }

        let opponent = opponent.filter(|o| *o != Address::ZERO);
        match opponent {
            Some(o) if o == caller => return Err(GameError::SelfPlay),
            None if !config.open_join => return Err(GameError::OpponentRequired),
            _ => {}
        }

        Ok(Self {
            id,
            player1: caller,
            player2: Address::ZERO,
            opponent,
            commitment,
            stake,
            player2_move: None,
            last_action: now,
            phase: Phase::Created,
            result: None,
        })
    }

    /// Player 2 matches the stake and submits their move in the clear.
    pub fn join(
        &mut self,
        caller: Address,
        mv: Move,
        payment: u64,
        now: u64,
        config: &ProtocolConfig,
    ) -> Result<(), GameError> {
        self.require_phase(Operation::Join, Phase::Created)?;

        match self.opponent {
            Some(opponent) if caller != opponent => return Err(GameError::NotParticipant),
            None if !config.open_join => return Err(GameError::NotParticipant),
            None if caller == self.player1 || caller == Address::ZERO => {
                return Err(GameError::SelfPlay)
            }
            _ => {}
        }

        if payment != self.stake {
            return Err(GameError::InvalidStake(format!(
                "payment {} must equal stake {}",
                payment, self.stake
            )));
        }

        self.player2 = caller;
        self.player2_move = Some(mv);
        self.phase = Phase::Joined;
        self.last_action = now;
        Ok(())
    }

    /// Player 1 opens the commitment; the winner takes the pot.
    pub fn reveal(
        &mut self,
        caller: Address,
        mv: Move,
        secret: &Secret,
        now: u64,
    ) -> Result<Vec<Transfer>, GameError> {
        self.require_phase(Operation::Reveal, Phase::Joined)?;

        if caller != self.player1 {
            return Err(GameError::NotParticipant);
        }
        if !self.commitment.verify(mv, secret) {
            return Err(GameError::CommitmentMismatch);
        }
        let player2_move = self.player2_move.ok_or(GameError::InvalidState {
            operation: Operation::Reveal,
            phase: self.phase,
        })?;

        let result = RpslsGame::judge(mv, player2_move);
        let transfers = match result {
            GameResult::AWins => vec![Transfer {
                to: self.player1,
                amount: self.pot(),
            }],
            GameResult::BWins => vec![Transfer {
                to: self.player2,
                amount: self.pot(),
            }],
            GameResult::Draw => vec![
                Transfer {
                    to: self.player1,
                    amount: self.stake,
                },
                Transfer {
                    to: self.player2,
                    amount: self.stake,
                },
            ],
        };

        self.result = Some(result);
        self.phase = Phase::Resolved;
        self.last_action = now;
        Ok(transfers)
    }

    /// Nobody joined within the window: player 1 takes their stake back.
    pub fn claim_player1_timeout(
        &mut self,
        caller: Address,
        now: u64,
        window: Duration,
    ) -> Result<Vec<Transfer>, GameError> {
        self.require_live(Operation::Player1Timeout)?;

        if caller != self.player1 {
            return Err(GameError::NotParticipant);
        }
        // Once joined, player 1 is the only one who can stall.
        self.require_phase(Operation::Player1Timeout, Phase::Created)?;
        self.require_expired(now, window)?;

        self.phase = Phase::TimedOut;
        self.last_action = now;
        Ok(vec![Transfer {
            to: self.player1,
            amount: self.stake,
        }])
    }

    /// Player 1 never revealed: player 2 takes the whole pot.
    pub fn claim_player2_timeout(
        &mut self,
        caller: Address,
        now: u64,
        window: Duration,
    ) -> Result<Vec<Transfer>, GameError> {
        self.require_live(Operation::Player2Timeout)?;
        self.require_phase(Operation::Player2Timeout, Phase::Joined)?;

        if caller != self.player2 {
            return Err(GameError::NotParticipant);
        }
        self.require_expired(now, window)?;

        self.phase = Phase::TimedOut;
        self.last_action = now;
        Ok(vec![Transfer {
            to: self.player2,
            amount: self.pot(),
        }])
    }

    fn require_phase(&self, operation: Operation, expected: Phase) -> Result<(), GameError> {
        if self.phase != expected {
            return Err(GameError::InvalidState {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn require_live(&self, operation: Operation) -> Result<(), GameError> {
        if self.phase.is_terminal() {
            return Err(GameError::InvalidState {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn require_expired(&self, now: u64, window: Duration) -> Result<(), GameError> {
        let left = timeout::remaining(self.last_action, now, window);
        if !left.is_zero() {
            return Err(GameError::TimeoutNotReached {
                remaining_secs: left.as_secs(),
            });
        }
        Ok(())
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn player1(&self) -> Address {
        self.player1
    }

    pub fn player2(&self) -> Address {
        self.player2
    }

    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    /// Total escrow once both sides have paid
    pub fn pot(&self) -> u64 {
        self.stake.saturating_mul(2)
    }

    pub fn player2_move(&self) -> Option<Move> {
        self.player2_move
    }

    pub fn last_action(&self) -> u64 {
        self.last_action
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn view(&self, timeout_window_secs: u64) -> GameView {
        GameView {
            game_id: self.id,
            player1: self.player1,
            player2: self.player2,
            opponent: self.opponent,
            commitment: self.commitment,
            stake: self.stake,
            player2_move: self.player2_move.map(|m| m.code()).unwrap_or(0),
            last_action: self.last_action,
            timeout_window_secs,
            phase: self.phase,
            result: self.result,
        }
    }
}
