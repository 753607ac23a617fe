//! Timeout monitor.
//!
//! Liveness status is always derived from the game's last action timestamp and
//! the authority's clock. Nothing here stores "time left"; any countdown shown
//! by a client is advisory and must be reconciled against the authority before
//! a claim is submitted.

use crate::protocol::Phase;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time left before the waiting party may claim, floored at zero.
///
/// Timestamps are unix seconds. A `now` earlier than `last_action` (clock
/// skew) counts as no time elapsed.
pub fn remaining(last_action: u64, now: u64, window: Duration) -> Duration {
    let elapsed = now.saturating_sub(last_action);
    Duration::from_secs(window.as_secs().saturating_sub(elapsed))
}

/// True once the full window has elapsed since the last action.
pub fn expired(last_action: u64, now: u64, window: Duration) -> bool {
    remaining(last_action, now, window).is_zero()
}

/// Which timeout claim the authority would accept
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    /// Nobody joined: player 1 reclaims their stake
    Player1,
    /// Player 1 never revealed: player 2 takes the pot
    Player2,
}

/// Derived liveness view of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutStatus {
    pub phase: Phase,
    pub last_action: u64,
    pub now: u64,
    pub remaining_secs: u64,
    pub expired: bool,
    pub claimable: Option<ClaimKind>,
}

impl TimeoutStatus {
    pub fn evaluate(phase: Phase, last_action: u64, now: u64, window: Duration) -> Self {
        let left = remaining(last_action, now, window);
        let expired = left.is_zero();
        let claimable = match (phase, expired) {
            (Phase::Created, true) => Some(ClaimKind::Player1),
            (Phase::Joined, true) => Some(ClaimKind::Player2),
            _ => None,
        };

        Self {
            phase,
            last_action,
            now,
            remaining_secs: left.as_secs(),
            expired: expired && !phase.is_terminal(),
            claimable,
        }
    }
}
