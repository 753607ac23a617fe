//! Session ledger: where player 1 keeps the move and secret needed to reveal.
//!
//! Losing a record before reveal is unrecoverable for the player (the game
//! can then only end through the timeout path), so implementations must be
//! durable across the gap between create and reveal.

mod file;
mod mock;
mod traits;

pub use file::FileSessionLedger;
pub use mock::MemorySessionLedger;
pub use traits::{SessionError, SessionLedger, SessionRecord};
