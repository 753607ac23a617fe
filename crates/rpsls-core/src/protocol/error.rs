//! Protocol errors.

use super::types::{GameId, Operation, Phase};
use alloy_primitives::Address;
use thiserror::Error;

/// Errors from protocol operations.
///
/// Every variant is raised before any state change or fund movement, so a
/// rejected operation has no effect and may be retried safely.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid move code {0}: expected 1-5")]
    InvalidMove(u8),

    #[error("Invalid stake: {0}")]
    InvalidStake(String),

    #[error("Opponent must differ from the creator")]
    SelfPlay,

    #[error("Cannot {operation} a game in phase {phase}")]
    InvalidState { operation: Operation, phase: Phase },

    #[error("Reveal does not match commitment")]
    CommitmentMismatch,

    #[error("Caller is not a participant allowed to perform this operation")]
    NotParticipant,

    #[error("Timeout not reached: {remaining_secs}s remaining")]
    TimeoutNotReached { remaining_secs: u64 },

    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("An opponent must be named when open join is disabled")]
    OpponentRequired,

    #[error("Malformed commitment")]
    MalformedCommitment,

    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("Crediting {amount} would overflow the balance of {account}")]
    BalanceOverflow { account: Address, amount: u64 },
}

impl GameError {
    /// Stable machine-readable code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidMove(_) => "invalid_move",
            GameError::InvalidStake(_) => "invalid_stake",
            GameError::SelfPlay => "self_play",
            GameError::InvalidState { .. } => "invalid_state",
            GameError::CommitmentMismatch => "commitment_mismatch",
            GameError::NotParticipant => "not_participant",
            GameError::TimeoutNotReached { .. } => "timeout_not_reached",
            GameError::GameNotFound(_) => "game_not_found",
            GameError::OpponentRequired => "opponent_required",
            GameError::MalformedCommitment => "malformed_commitment",
            GameError::InsufficientFunds { .. } => "insufficient_funds",
            GameError::BalanceOverflow { .. } => "balance_overflow",
        }
    }
}
