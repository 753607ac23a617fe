//! In-memory ledger authority.
//!
//! The authority owns every game and every balance, executes operations one at
//! a time, and is the single source of truth for time.

mod clock;
mod ledger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::Authority;
