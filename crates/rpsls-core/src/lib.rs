//! RPSLS Core Library
//!
//! This crate provides the protocol logic for a two-party, stake-bearing game of
//! Rock-Paper-Scissors-Spock-Lizard played over an asynchronous ledger:
//! - commitment codec for the first mover's hidden move
//! - result resolver for the five-way rule set
//! - the game state machine with timeout forfeiture
//! - an in-memory ledger authority holding escrow and balances
//! - the session ledger used by players to keep their reveal secret

pub mod authority;
pub mod config;
pub mod crypto;
pub mod games;
pub mod protocol;
pub mod session;
pub mod timeout;

pub use authority::{Authority, Clock, ManualClock, SystemClock};
pub use config::ProtocolConfig;
pub use crypto::{commit, verify, Commitment, Secret};
pub use games::{resolve, Move, RpslsGame};
pub use protocol::{
    Game, GameError, GameId, GameResult, GameView, Operation, Phase, Settlement, Transfer,
};
pub use session::{
    FileSessionLedger, MemorySessionLedger, SessionError, SessionLedger, SessionRecord,
};
pub use timeout::{ClaimKind, TimeoutStatus};
