//! HTTP API handlers.

use alloy_primitives::Address;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rpsls_core::protocol::{
    AccountResponse, CreateGameRequest, CreateGameResponse, DepositRequest, ErrorResponse,
    GamesResponse, JoinGameRequest, RevealRequest, StatusResponse,
};
use rpsls_core::{GameError, GameId, GameView, ProtocolConfig, Settlement, TimeoutStatus};
use serde::Deserialize;
use std::str::FromStr;

use crate::state::AppState;

pub use rpsls_core::protocol::CALLER_HEADER;

// ============ Errors ============

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Game(GameError),
    MissingCaller,
    BadRequest(String),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        AppError::Game(err)
    }
}

// Malformed bodies and paths get the same error body as protocol errors.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Game(err) => {
                let status = match err {
                    GameError::GameNotFound(_) => StatusCode::NOT_FOUND,
                    GameError::NotParticipant => StatusCode::FORBIDDEN,
                    GameError::InvalidState { .. } | GameError::TimeoutNotReached { .. } => {
                        StatusCode::CONFLICT
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, ErrorResponse::from(&err))
            }
            AppError::MissingCaller => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(
                    "missing_caller",
                    format!("Missing or invalid {} header", CALLER_HEADER),
                ),
            ),
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new("bad_request", message))
            }
        };
        (status, Json(body)).into_response()
    }
}

// ============ Query types ============

#[derive(Deserialize)]
pub struct GamesQuery {
    pub player: Option<String>,
}

// ============ Helpers ============

fn caller_from_headers(headers: &HeaderMap) -> Result<Address, AppError> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Address::from_str(s.trim()).ok())
        .ok_or(AppError::MissingCaller)
}

fn parse_address(raw: &str) -> Result<Address, AppError> {
    Address::from_str(raw).map_err(|e| AppError::BadRequest(format!("Invalid address: {}", e)))
}

// ============ Operation handlers ============

pub async fn create_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<Json<CreateGameResponse>, AppError> {
    let caller = caller_from_headers(&headers)?;
    let Json(req) = req?;
    let game_id = state.create_game(caller, req.commitment, req.opponent, req.value)?;
    Ok(Json(CreateGameResponse { game_id }))
}

pub async fn join_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    game_id: Result<Path<GameId>, PathRejection>,
    req: Result<Json<JoinGameRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let caller = caller_from_headers(&headers)?;
    let Path(game_id) = game_id?;
    let Json(req) = req?;
    state.join_game(game_id, caller, req.move_code, req.value)?;
    Ok(Json(StatusResponse {
        status: "joined".to_string(),
    }))
}

pub async fn reveal(
    State(state): State<AppState>,
    headers: HeaderMap,
    game_id: Result<Path<GameId>, PathRejection>,
    req: Result<Json<RevealRequest>, JsonRejection>,
) -> Result<Json<Settlement>, AppError> {
    let caller = caller_from_headers(&headers)?;
    let Path(game_id) = game_id?;
    let Json(req) = req?;
    let settlement = state.reveal(game_id, caller, req.move_code, &req.secret)?;
    Ok(Json(settlement))
}

pub async fn player1_timeout(
    State(state): State<AppState>,
    headers: HeaderMap,
    game_id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<Settlement>, AppError> {
    let caller = caller_from_headers(&headers)?;
    let Path(game_id) = game_id?;
    Ok(Json(state.player1_timeout(game_id, caller)?))
}

pub async fn player2_timeout(
    State(state): State<AppState>,
    headers: HeaderMap,
    game_id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<Settlement>, AppError> {
    let caller = caller_from_headers(&headers)?;
    let Path(game_id) = game_id?;
    Ok(Json(state.player2_timeout(game_id, caller)?))
}

// ============ Query handlers ============

pub async fn get_game(
    State(state): State<AppState>,
    game_id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<GameView>, AppError> {
    let Path(game_id) = game_id?;
    Ok(Json(state.get_game(game_id)?))
}

pub async fn get_timeout_status(
    State(state): State<AppState>,
    game_id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<TimeoutStatus>, AppError> {
    let Path(game_id) = game_id?;
    Ok(Json(state.timeout_status(game_id)?))
}

pub async fn list_open_games(State(state): State<AppState>) -> Json<GamesResponse> {
    Json(GamesResponse {
        games: state.list_open_games(),
    })
}

/// All games, or only those a player created or joined
pub async fn list_games(
    State(state): State<AppState>,
    query: Result<Query<GamesQuery>, QueryRejection>,
) -> Result<Json<GamesResponse>, AppError> {
    let Query(query) = query?;
    let player = query.player.as_deref().map(parse_address).transpose()?;
    Ok(Json(GamesResponse {
        games: state.list_games(player),
    }))
}

pub async fn get_config(State(state): State<AppState>) -> Json<ProtocolConfig> {
    Json(state.config())
}

// ============ Account handlers ============

pub async fn get_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let address = parse_address(&address)?;
    Ok(Json(AccountResponse {
        address,
        balance: state.balance(address),
    }))
}

pub async fn deposit(
    State(state): State<AppState>,
    Path(address): Path<String>,
    req: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, AppError> {
    let address = parse_address(&address)?;
    let Json(req) = req?;
    let balance = state.deposit(address, req.amount)?;
    Ok(Json(AccountResponse { address, balance }))
}

pub async fn health() -> &'static str {
    "ok"
}
