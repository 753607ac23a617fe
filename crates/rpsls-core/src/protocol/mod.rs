//! Protocol types, the game state machine and wire messages.

mod error;
mod game;
mod messages;
mod types;

pub use error::GameError;
pub use game::Game;
pub use messages::{
    AccountResponse, CreateGameRequest, CreateGameResponse, DepositRequest, ErrorResponse,
    GamesResponse, JoinGameRequest, RevealRequest, StatusResponse, CALLER_HEADER,
};
pub use types::{GameId, GameResult, GameView, Operation, Phase, Settlement, Transfer};
