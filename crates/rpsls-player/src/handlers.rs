//! Player agent HTTP handlers.

use alloy_primitives::Address;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rpsls_core::protocol::{
    CreateGameRequest, DepositRequest, ErrorResponse, JoinGameRequest, RevealRequest,
};
use rpsls_core::{
    resolve, ClaimKind, Commitment, GameError, GameId, GameResult, GameView, Move, Phase, Secret,
    SessionError, SessionRecord, Settlement,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::ClientError;
use crate::history::{GameRecord, HistoryFilter, HistorySummary};
use crate::state::PlayerState;

// ============ Errors ============

#[derive(Debug)]
pub enum AppError {
    /// The authority refused the operation or could not be reached
    Authority(ClientError),
    /// Rejected locally before anything was sent
    Game(GameError),
    Session(SessionError),
    /// The game was created and its stake escrowed, but the move could not be
    /// stored; only a timeout reclaim can end it
    SessionNotStored {
        game_id: GameId,
        source: SessionError,
    },
    /// Malformed path, query or body
    BadRequest(String),
    /// No stored move and secret for this game; the commitment cannot be opened
    SessionMissing(GameId),
    /// Nothing this player may claim yet
    NothingToClaim { phase: Phase, remaining_secs: u64 },
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        AppError::Authority(err)
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        AppError::Game(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

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
        let game_id = match &self {
            AppError::SessionNotStored { game_id, .. } => Some(*game_id),
            _ => None,
        };
        let (status, error, message) = match self {
            AppError::Authority(ClientError::Rejected {
                status,
                code,
                message,
            }) => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                code,
                message,
            ),
            AppError::Authority(err @ ClientError::Transport(_)) => (
                StatusCode::BAD_GATEWAY,
                "authority_unreachable".to_string(),
                err.to_string(),
            ),
            AppError::Game(err) => (
                StatusCode::BAD_REQUEST,
                err.code().to_string(),
                err.to_string(),
            ),
            AppError::Session(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "session_storage".to_string(),
                err.to_string(),
            ),
            AppError::SessionNotStored { game_id, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "session_not_stored".to_string(),
                format!(
                    "Game {} was created but its move could not be stored ({}); reclaim the stake by timeout",
                    game_id, source
                ),
            ),
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "bad_request".to_string(), message)
            }
            AppError::SessionMissing(game_id) => (
                StatusCode::NOT_FOUND,
                "session_missing".to_string(),
                format!(
                    "No stored move for game {}; it can only end by timeout",
                    game_id
                ),
            ),
            AppError::NothingToClaim {
                phase,
                remaining_secs,
            } => (
                StatusCode::CONFLICT,
                "nothing_to_claim".to_string(),
                format!(
                    "No timeout claim available in phase {} ({}s remaining)",
                    phase, remaining_secs
                ),
            ),
        };
        let body = ErrorResponse::new(error, message);
        let body = match game_id {
            Some(game_id) => body.with_game_id(game_id),
            None => body,
        };
        (status, Json(body)).into_response()
    }
}

// ============ Request/Response types ============

#[derive(Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub opponent: Option<Address>,
    pub stake: u64,
    #[serde(rename = "move")]
    pub move_code: u8,
}

#[derive(Serialize, Deserialize)]
pub struct CreateResponse {
    pub game_id: GameId,
    pub commitment: Commitment,
}

#[derive(Deserialize)]
pub struct JoinRequest {
    #[serde(rename = "move")]
    pub move_code: u8,
}

#[derive(Serialize, Deserialize)]
pub struct JoinResponse {
    pub game_id: GameId,
    pub stake: u64,
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct PlayerInfoResponse {
    pub address: Address,
    pub balance: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player1,
    Player2,
    Observer,
}

#[derive(Serialize, Deserialize)]
pub struct GameStatusResponse {
    pub game: GameView,
    pub role: Role,
    /// Advisory only; claims are always checked against the authority
    pub remaining_secs: u64,
    pub claimable: Option<ClaimKind>,
    /// Set when this player holds the stored move for the game
    pub my_move: Option<Move>,
    /// Settled result, or the outcome the pending reveal will produce
    pub result: Option<GameResult>,
}

#[derive(Deserialize)]
pub struct GamesQuery {
    #[serde(default)]
    pub filter: HistoryFilter,
}

#[derive(Serialize, Deserialize)]
pub struct GamesHistoryResponse {
    pub games: Vec<GameRecord>,
    /// Totals over every game, whatever the filter
    pub summary: HistorySummary,
}

fn role_of(view: &GameView, address: Address) -> Role {
    if view.player1 == address {
        Role::Player1
    } else if view.player2 == address && view.phase != Phase::Created {
        Role::Player2
    } else {
        Role::Observer
    }
}

// ============ Handlers ============

pub async fn get_player_info(
    State(state): State<Arc<PlayerState>>,
) -> Result<Json<PlayerInfoResponse>, AppError> {
    let account = state.client.account(state.address).await?;
    Ok(Json(PlayerInfoResponse {
        address: state.address,
        balance: account.balance,
    }))
}

pub async fn deposit(
    State(state): State<Arc<PlayerState>>,
    req: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Json<PlayerInfoResponse>, AppError> {
    let Json(req) = req?;
    let account = state.client.deposit(state.address, req.amount).await?;
    Ok(Json(PlayerInfoResponse {
        address: state.address,
        balance: account.balance,
    }))
}

pub async fn create_game(
    State(state): State<Arc<PlayerState>>,
    req: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<CreateResponse>, AppError> {
    let Json(req) = req?;
    let player_move = Move::try_from(req.move_code)?;
    let secret = Secret::random();
    let commitment = Commitment::new(player_move, &secret);

    let created = state
        .client
        .create_game(
            state.address,
            &CreateGameRequest {
                commitment,
                opponent: req.opponent,
                value: req.stake,
            },
        )
        .await?;
    let game_id = created.game_id;

    let record = SessionRecord::new(player_move, secret, req.opponent, req.stake);
    if let Err(err) = state.sessions.put(game_id, record).await {
        // The stake is escrowed but the move can no longer be revealed.
        error!(game_id = %game_id, error = %err, "failed to persist session record");
        return Err(AppError::SessionNotStored {
            game_id,
            source: err,
        });
    }

    info!(game_id = %game_id, stake = req.stake, "created game");
    Ok(Json(CreateResponse {
        game_id,
        commitment,
    }))
}

pub async fn join_game(
    State(state): State<Arc<PlayerState>>,
    game_id: Result<Path<GameId>, PathRejection>,
    req: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<JoinResponse>, AppError> {
    let Path(game_id) = game_id?;
    let Json(req) = req?;
    let player_move = Move::try_from(req.move_code)?;
    let view = state.client.game(game_id).await?;

    let joined = state
        .client
        .join_game(
            state.address,
            game_id,
            &JoinGameRequest {
                move_code: player_move.code(),
                value: view.stake,
            },
        )
        .await?;

    info!(game_id = %game_id, stake = view.stake, "joined game");
    Ok(Json(JoinResponse {
        game_id,
        stake: view.stake,
        status: joined.status,
    }))
}

pub async fn reveal(
    State(state): State<Arc<PlayerState>>,
    game_id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<Settlement>, AppError> {
    let Path(game_id) = game_id?;
    let record = state
        .sessions
        .get(game_id)
        .await?
        .ok_or(AppError::SessionMissing(game_id))?;

    let settlement = state
        .client
        .reveal(
            state.address,
            game_id,
            &RevealRequest {
                move_code: record.player_move.code(),
                secret: record.secret,
            },
        )
        .await?;

    if let Err(err) = state.sessions.remove(game_id).await {
        warn!(game_id = %game_id, error = %err, "failed to drop session record");
    }

    info!(game_id = %game_id, result = ?settlement.result, "revealed");
    Ok(Json(settlement))
}

pub async fn claim_timeout(
    State(state): State<Arc<PlayerState>>,
    game_id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<Settlement>, AppError> {
    let Path(game_id) = game_id?;
    let view = state.client.game(game_id).await?;
    let status = state.client.timeout_status(game_id).await?;
    let role = role_of(&view, state.address);

    let settlement = match (status.claimable, role) {
        (Some(ClaimKind::Player1), Role::Player1) => {
            state.client.player1_timeout(state.address, game_id).await?
        }
        (Some(ClaimKind::Player2), Role::Player2) => {
            state.client.player2_timeout(state.address, game_id).await?
        }
        _ => {
            return Err(AppError::NothingToClaim {
                phase: status.phase,
                remaining_secs: status.remaining_secs,
            })
        }
    };

    if role == Role::Player1 {
        if let Err(err) = state.sessions.remove(game_id).await {
            warn!(game_id = %game_id, error = %err, "failed to drop session record");
        }
    }

    info!(game_id = %game_id, phase = %settlement.phase, "timeout claimed");
    Ok(Json(settlement))
}

pub async fn get_game_status(
    State(state): State<Arc<PlayerState>>,
    game_id: Result<Path<GameId>, PathRejection>,
) -> Result<Json<GameStatusResponse>, AppError> {
    let Path(game_id) = game_id?;
    let view = state.client.game(game_id).await?;
    let timeout = state.client.timeout_status(game_id).await?;
    let role = role_of(&view, state.address);

    let my_move = match role {
        Role::Player1 => state
            .sessions
            .get(game_id)
            .await?
            .map(|record| record.player_move),
        Role::Player2 => Move::try_from(view.player2_move).ok(),
        Role::Observer => None,
    };

    let result = match (view.result, view.phase, role, my_move) {
        (Some(result), _, _, _) => Some(result),
        (None, Phase::Joined, Role::Player1, Some(mine)) => {
            resolve(mine.code(), view.player2_move).ok()
        }
        _ => None,
    };

    Ok(Json(GameStatusResponse {
        remaining_secs: timeout.remaining_secs,
        claimable: timeout.claimable,
        game: view,
        role,
        my_move,
        result,
    }))
}

pub async fn list_games(
    State(state): State<Arc<PlayerState>>,
    query: Result<Query<GamesQuery>, QueryRejection>,
) -> Result<Json<GamesHistoryResponse>, AppError> {
    let Query(query) = query?;
    let records: Vec<GameRecord> = state
        .client
        .games_for(state.address)
        .await?
        .iter()
        .filter_map(|view| GameRecord::from_view(view, state.address))
        .collect();

    let summary = HistorySummary::from_records(&records);
    let games = records
        .into_iter()
        .filter(|record| query.filter.matches(record))
        .collect();

    Ok(Json(GamesHistoryResponse { games, summary }))
}
