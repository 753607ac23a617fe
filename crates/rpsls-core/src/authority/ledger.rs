//! Ledger authority: escrow, balances and the game registry.

use super::clock::{Clock, SystemClock};
use crate::config::ProtocolConfig;
use crate::crypto::{Commitment, Secret};
use crate::games::Move;
use crate::protocol::{Game, GameError, GameId, GameView, Operation, Phase, Settlement, Transfer};
use crate::timeout::TimeoutStatus;
use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Executes protocol operations atomically against its games and balances.
///
/// Every state-changing operation runs the game transition on a copy and
/// commits the copy together with the fund movements only when every check has
/// passed. Callers needing concurrent access wrap the authority in a mutex,
/// which linearizes operations.
pub struct Authority {
    config: ProtocolConfig,
    clock: Arc<dyn Clock>,
    /// Highest timestamp observed, so time never runs backwards
    last_seen: u64,
    games: HashMap<GameId, Game>,
    balances: HashMap<Address, u64>,
}

impl Authority {
    /// Create an authority on the wall clock
    pub fn new(config: ProtocolConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ProtocolConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            last_seen: 0,
            games: HashMap::new(),
            balances: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn timeout_window(&self) -> Duration {
        self.config.timeout_window()
    }

    /// Current authority time, never earlier than any time already observed
    pub fn now(&self) -> u64 {
        self.clock.now().max(self.last_seen)
    }

    fn tick(&mut self) -> u64 {
        let now = self.now();
        self.last_seen = now;
        now
    }

    // Accounts

    /// Credit an account, returning the new balance
    pub fn deposit(&mut self, account: Address, amount: u64) -> Result<u64, GameError> {
        let balance = self
            .balance(account)
            .checked_add(amount)
            .ok_or(GameError::BalanceOverflow { account, amount })
            .map_err(|err| {
                warn!(account = %account, amount, error = %err, "deposit rejected");
                err
            })?;
        self.balances.insert(account, balance);
        info!(account = %account, amount, balance, "deposit");
        Ok(balance)
    }

    pub fn balance(&self, account: Address) -> u64 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    fn ensure_funds(&self, account: Address, needed: u64) -> Result<(), GameError> {
        let available = self.balance(account);
        if available < needed {
            return Err(GameError::InsufficientFunds { needed, available });
        }
        Ok(())
    }

    fn debit(&mut self, account: Address, amount: u64) {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.saturating_sub(amount);
    }

    /// Balances after paying out `transfers`, computed without touching the ledger.
    fn credited(&self, transfers: &[Transfer]) -> Result<HashMap<Address, u64>, GameError> {
        let mut updated: HashMap<Address, u64> = HashMap::new();
        for transfer in transfers {
            let current = updated
                .get(&transfer.to)
                .copied()
                .unwrap_or_else(|| self.balance(transfer.to));
            let balance = current
                .checked_add(transfer.amount)
                .ok_or(GameError::BalanceOverflow {
                    account: transfer.to,
                    amount: transfer.amount,
                })?;
            updated.insert(transfer.to, balance);
        }
        Ok(updated)
    }

    // Operations

    /// `create(commitment, opponent) payable(value)`
    pub fn create(
        &mut self,
        caller: Address,
        commitment: Commitment,
        opponent: Option<Address>,
        value: u64,
    ) -> Result<GameId, GameError> {
        let now = self.tick();
        let game_id = GameId::new();

        let result = Game::create(
            game_id,
            caller,
            opponent,
            commitment,
            value,
            now,
            &self.config,
        )
        .and_then(|game| {
            self.ensure_funds(caller, value)?;
            Ok(game)
        });

        match result {
            Ok(game) => {
                self.debit(caller, value);
                self.games.insert(game_id, game);
                info!(game_id = %game_id, caller = %caller, stake = value, "game created");
                Ok(game_id)
            }
            Err(err) => Err(Self::rejected(Operation::Create, game_id, caller, err)),
        }
    }

    /// `join(move) payable(value)`
    pub fn join(
        &mut self,
        game_id: GameId,
        caller: Address,
        move_code: u8,
        value: u64,
    ) -> Result<Settlement, GameError> {
        let now = self.tick();
        let config = self.config;

        let result = Move::try_from(move_code).and_then(|mv| {
            let mut next = self.lookup(game_id)?.clone();
            next.join(caller, mv, value, now, &config)?;
            self.ensure_funds(caller, value)?;
            Ok(next)
        });

        match result {
            Ok(next) => {
                self.debit(caller, value);
                let settlement = Self::settlement(&next, Vec::new());
                self.games.insert(game_id, next);
                info!(game_id = %game_id, caller = %caller, "player 2 joined");
                Ok(settlement)
            }
            Err(err) => Err(Self::rejected(Operation::Join, game_id, caller, err)),
        }
    }

    /// `reveal(move, secret)`
    pub fn reveal(
        &mut self,
        game_id: GameId,
        caller: Address,
        move_code: u8,
        secret: &Secret,
    ) -> Result<Settlement, GameError> {
        let mv = Move::try_from(move_code)
            .map_err(|err| Self::rejected(Operation::Reveal, game_id, caller, err))?;
        self.settle(game_id, caller, Operation::Reveal, |game, now, _| {
            game.reveal(caller, mv, secret, now)
        })
    }

    /// `player1Timeout()`
    pub fn player1_timeout(
        &mut self,
        game_id: GameId,
        caller: Address,
    ) -> Result<Settlement, GameError> {
        self.settle(game_id, caller, Operation::Player1Timeout, |game, now, window| {
            game.claim_player1_timeout(caller, now, window)
        })
    }

    /// `player2Timeout()`
    pub fn player2_timeout(
        &mut self,
        game_id: GameId,
        caller: Address,
    ) -> Result<Settlement, GameError> {
        self.settle(game_id, caller, Operation::Player2Timeout, |game, now, window| {
            game.claim_player2_timeout(caller, now, window)
        })
    }

    /// Apply a paying transition on a copy, then commit game and payouts together.
    fn settle<F>(
        &mut self,
        game_id: GameId,
        caller: Address,
        operation: Operation,
        transition: F,
    ) -> Result<Settlement, GameError>
    where
        F: FnOnce(&mut Game, u64, Duration) -> Result<Vec<Transfer>, GameError>,
    {
        let now = self.tick();
        let window = self.timeout_window();

        let result = self.lookup(game_id).and_then(|game| {
            let mut next = game.clone();
            let transfers = transition(&mut next, now, window)?;
            let balances = self.credited(&transfers)?;
            Ok((next, transfers, balances))
        });

        match result {
            Ok((next, transfers, balances)) => {
                self.balances.extend(balances);
                let settlement = Self::settlement(&next, transfers);
                self.games.insert(game_id, next);
                info!(
                    game_id = %game_id,
                    caller = %caller,
                    operation = %operation,
                    phase = %settlement.phase,
                    result = ?settlement.result,
                    "game settled"
                );
                Ok(settlement)
            }
            Err(err) => Err(Self::rejected(operation, game_id, caller, err)),
        }
    }

    fn settlement(game: &Game, transfers: Vec<Transfer>) -> Settlement {
        Settlement {
            game_id: game.id(),
            phase: game.phase(),
            result: game.result(),
            transfers,
        }
    }

    fn rejected(
        operation: Operation,
        game_id: GameId,
        caller: Address,
        err: GameError,
    ) -> GameError {
        warn!(
            game_id = %game_id,
            caller = %caller,
            operation = %operation,
            error = %err,
            "operation rejected"
        );
        err
    }

    fn lookup(&self, game_id: GameId) -> Result<&Game, GameError> {
        self.games
            .get(&game_id)
            .ok_or(GameError::GameNotFound(game_id))
    }

    // Queries

    pub fn game(&self, game_id: GameId) -> Result<GameView, GameError> {
        self.lookup(game_id)
            .map(|game| game.view(self.config.timeout_window_secs))
    }

    pub fn games(&self) -> Vec<GameView> {
        self.games
            .values()
            .map(|game| game.view(self.config.timeout_window_secs))
            .collect()
    }

    /// Games still waiting for a second player
    pub fn open_games(&self) -> Vec<GameView> {
        self.games()
            .into_iter()
            .filter(|view| view.phase == Phase::Created)
            .collect()
    }

    /// Games the player created or joined, most recent action first
    pub fn games_for(&self, player: Address) -> Vec<GameView> {
        let mut games: Vec<GameView> = self
            .games()
            .into_iter()
            .filter(|view| {
                view.player1 == player || (view.player2 == player && view.player2 != Address::ZERO)
            })
            .collect();
        games.sort_by(|a, b| b.last_action.cmp(&a.last_action));
        games
    }

    /// Funds currently held in escrow by unsettled games
    pub fn escrowed(&self) -> u64 {
        self.games
            .values()
            .map(|game| match game.phase() {
                Phase::Created => game.stake(),
                Phase::Joined => game.pot(),
                Phase::Resolved | Phase::TimedOut => 0,
            })
            .sum()
    }

    pub fn timeout_status(&self, game_id: GameId) -> Result<TimeoutStatus, GameError> {
        let game = self.lookup(game_id)?;
        Ok(TimeoutStatus::evaluate(
            game.phase(),
            game.last_action(),
            self.now(),
            self.timeout_window(),
        ))
    }
}
