//! RPSLS Ledger Authority Service
//!
//! HTTP front for the in-memory ledger authority. Every state-changing route
//! maps to one protocol operation; the caller is taken from the `X-Caller`
//! header the way a ledger takes the sender of a transaction.

mod handlers;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::{AppError, CALLER_HEADER};
pub use state::AppState;

use handlers::*;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Operations
        .route("/game/create", post(create_game))
        .route("/game/:game_id/join", post(join_game))
        .route("/game/:game_id/reveal", post(reveal))
        .route("/game/:game_id/player1-timeout", post(player1_timeout))
        .route("/game/:game_id/player2-timeout", post(player2_timeout))
        // Queries
        .route("/game/:game_id", get(get_game))
        .route("/game/:game_id/timeout", get(get_timeout_status))
        .route("/games", get(list_games))
        .route("/games/open", get(list_open_games))
        .route("/config", get(get_config))
        // Accounts
        .route("/account/:address", get(get_account))
        .route("/account/:address/deposit", post(deposit))
        // Health
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
