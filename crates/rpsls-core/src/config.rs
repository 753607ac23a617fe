//! Protocol configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default window a party has to act before the other may claim a timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Authority-wide protocol settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Seconds after the last action at which the waiting party may claim.
    pub timeout_window_secs: u64,
    /// Allow any non-creator to join a game created without a named opponent.
    pub open_join: bool,
}

impl ProtocolConfig {
    /// Read `TIMEOUT_SECS` and `OPEN_JOIN`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout_window_secs = std::env::var("TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.timeout_window_secs);
        let open_join = std::env::var("OPEN_JOIN")
            .ok()
            .map(|s| parse_flag(&s))
            .unwrap_or(defaults.open_join);

        Self {
            timeout_window_secs,
            open_join,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_window_secs = secs;
        self
    }

    pub fn with_open_join(mut self, open_join: bool) -> Self {
        self.open_join = open_join;
        self
    }

    pub fn timeout_window(&self) -> Duration {
        Duration::from_secs(self.timeout_window_secs)
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            timeout_window_secs: DEFAULT_TIMEOUT_SECS,
            open_join: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
