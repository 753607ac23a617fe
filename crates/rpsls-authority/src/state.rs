//! Application state management.

use alloy_primitives::Address;
use rpsls_core::{
    Authority, Clock, Commitment, GameError, GameId, GameView, ProtocolConfig, Secret,
    Settlement, SystemClock, TimeoutStatus,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared application state
///
/// The mutex is the linearization point: operations on the authority never
/// interleave.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<Authority>>,
}

impl AppState {
    /// Create new state on the wall clock
    pub fn new(config: ProtocolConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create new state on a custom clock (for timeout testing)
    pub fn with_clock(config: ProtocolConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Authority::with_clock(config, clock))),
        }
    }

    fn authority(&self) -> MutexGuard<'_, Authority> {
        // Operations validate before mutating, so a poisoned lock still guards
        // a consistent authority.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn config(&self) -> ProtocolConfig {
        *self.authority().config()
    }

    // Operations

    pub fn create_game(
        &self,
        caller: Address,
        commitment: Commitment,
        opponent: Option<Address>,
        value: u64,
    ) -> Result<GameId, GameError> {
        self.authority().create(caller, commitment, opponent, value)
    }

    pub fn join_game(
        &self,
        game_id: GameId,
        caller: Address,
        move_code: u8,
        value: u64,
    ) -> Result<Settlement, GameError> {
        self.authority().join(game_id, caller, move_code, value)
    }

    pub fn reveal(
        &self,
        game_id: GameId,
        caller: Address,
        move_code: u8,
        secret: &Secret,
    ) -> Result<Settlement, GameError> {
        self.authority().reveal(game_id, caller, move_code, secret)
    }

    pub fn player1_timeout(&self, game_id: GameId, caller: Address) -> Result<Settlement, GameError> {
        self.authority().player1_timeout(game_id, caller)
    }

    pub fn player2_timeout(&self, game_id: GameId, caller: Address) -> Result<Settlement, GameError> {
        self.authority().player2_timeout(game_id, caller)
    }

    // Queries

    pub fn get_game(&self, game_id: GameId) -> Result<GameView, GameError> {
        self.authority().game(game_id)
    }

    pub fn timeout_status(&self, game_id: GameId) -> Result<TimeoutStatus, GameError> {
        self.authority().timeout_status(game_id)
    }

    pub fn list_open_games(&self) -> Vec<GameView> {
        self.authority().open_games()
    }

    pub fn list_games(&self, player: Option<Address>) -> Vec<GameView> {
        let authority = self.authority();
        match player {
            Some(player) => authority.games_for(player),
            None => authority.games(),
        }
    }

    // Accounts

    pub fn balance(&self, account: Address) -> u64 {
        self.authority().balance(account)
    }

    pub fn deposit(&self, account: Address, amount: u64) -> Result<u64, GameError> {
        self.authority().deposit(account, amount)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}
