//! Session ledger trait definition.

use crate::crypto::{Commitment, Secret};
use crate::games::Move;
use crate::protocol::GameId;
use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from session ledger operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Everything player 1 must retain to reveal later
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "move")]
    pub player_move: Move,
    pub secret: Secret,
    pub opponent: Option<Address>,
    pub stake: u64,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(player_move: Move, secret: Secret, opponent: Option<Address>, stake: u64) -> Self {
        Self {
            player_move,
            secret,
            opponent,
            stake,
            created_at: Utc::now(),
        }
    }

    /// The commitment this record opens
    pub fn commitment(&self) -> Commitment {
        Commitment::new(self.player_move, &self.secret)
    }
}

/// Durable keyed store of session records
///
/// Implementations can be:
/// - MemorySessionLedger for testing
/// - FileSessionLedger for a player agent on disk
#[async_trait]
pub trait SessionLedger: Send + Sync {
    /// Store the record for a game, replacing any previous one
    async fn put(&self, game_id: GameId, record: SessionRecord) -> Result<(), SessionError>;

    /// Fetch the record exactly as stored, if any
    async fn get(&self, game_id: GameId) -> Result<Option<SessionRecord>, SessionError>;

    /// Drop the record once the game can no longer be revealed
    async fn remove(&self, game_id: GameId) -> Result<(), SessionError>;
}
