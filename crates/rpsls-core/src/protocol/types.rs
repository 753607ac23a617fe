//! Protocol types.

use crate::crypto::Commitment;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique game identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Create a new random game ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameId({})", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game result, from player 1's side (A) against player 2 (B)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    AWins,
    BWins,
    Draw,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::AWins => "A wins",
            GameResult::BWins => "B wins",
            GameResult::Draw => "Draw",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle phase of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Created,
    Joined,
    Resolved,
    TimedOut,
}

impl Phase {
    /// Resolved and TimedOut accept no further operations
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Resolved | Phase::TimedOut)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Joined => "joined",
            Phase::Resolved => "resolved",
            Phase::TimedOut => "timed_out",
        };
        f.write_str(name)
    }
}

/// State-advancing operations accepted by the authority
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Join,
    Reveal,
    Player1Timeout,
    Player2Timeout,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Join => "join",
            Operation::Reveal => "reveal",
            Operation::Player1Timeout => "player1_timeout",
            Operation::Player2Timeout => "player2_timeout",
        };
        f.write_str(name)
    }
}

/// Funds released from escrow to a party
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub to: Address,
    pub amount: u64,
}

/// Outcome of a successful operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub game_id: GameId,
    pub phase: Phase,
    pub result: Option<GameResult>,
    pub transfers: Vec<Transfer>,
}

impl Settlement {
    /// Total amount paid to `party` by this settlement
    pub fn paid_to(&self, party: Address) -> u64 {
        self.transfers
            .iter()
            .filter(|t| t.to == party)
            .map(|t| t.amount)
            .sum()
    }
}

/// Read-only snapshot of a game as exposed by the authority
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub player1: Address,
    /// `Address::ZERO` until joined
    pub player2: Address,
    /// Opponent named at creation, `None` when left open
    pub opponent: Option<Address>,
    pub commitment: Commitment,
    pub stake: u64,
    /// 0 until joined
    pub player2_move: u8,
    pub last_action: u64,
    pub timeout_window_secs: u64,
    pub phase: Phase,
    pub result: Option<GameResult>,
}
