//! Wire messages exchanged with the ledger authority.
//!
//! The caller of every state-changing request is carried out of band (the
//! `X-Caller` header), the way a ledger infers the sender of a transaction.
//! Payable amounts travel as `value`.

use crate::crypto::{Commitment, Secret};
use crate::protocol::{GameError, GameId, GameView};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Header carrying the address of the party submitting an operation
pub const CALLER_HEADER: &str = "X-Caller";

/// `create(commitment, opponent) payable(stake)`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub commitment: Commitment,
    #[serde(default)]
    pub opponent: Option<Address>,
    pub value: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game_id: GameId,
}

/// `join(move) payable(stake)`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JoinGameRequest {
    #[serde(rename = "move")]
    pub move_code: u8,
    pub value: u64,
}

/// `reveal(move, secret)`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevealRequest {
    #[serde(rename = "move")]
    pub move_code: u8,
    pub secret: Secret,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepositRequest {
    pub amount: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub address: Address,
    pub balance: u64,
}

/// List of game snapshots
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GamesResponse {
    pub games: Vec<GameView>,
}

/// Body of every rejected request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Set when the game exists despite the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            game_id: None,
        }
    }

    pub fn with_game_id(mut self, game_id: GameId) -> Self {
        self.game_id = Some(game_id);
        self
    }
}

impl From<&GameError> for ErrorResponse {
    fn from(err: &GameError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}
