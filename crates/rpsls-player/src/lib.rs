//! RPSLS Player Agent
//!
//! Acts for a single address against the ledger authority. Player 1's move
//! and secret are generated here and kept in the session ledger until the
//! reveal; the authority only ever sees the commitment before then.

pub mod client;
mod handlers;
pub mod history;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use client::{AuthorityClient, ClientError};
pub use handlers::{
    AppError, CreateResponse, GameStatusResponse, GamesHistoryResponse, JoinResponse,
    PlayerInfoResponse, Role,
};
pub use history::{GameRecord, HistoryFilter, HistorySummary, Outcome};
pub use state::PlayerState;

use handlers::*;

pub fn create_router(state: Arc<PlayerState>) -> Router {
    Router::new()
        .route("/api/player", get(get_player_info))
        .route("/api/player/deposit", post(deposit))
        .route("/api/games", get(list_games))
        .route("/api/game/create", post(create_game))
        .route("/api/game/:game_id/join", post(join_game))
        .route("/api/game/:game_id/reveal", post(reveal))
        .route("/api/game/:game_id/claim-timeout", post(claim_timeout))
        .route("/api/game/:game_id/status", get(get_game_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
