//! HTTP client for the ledger authority.
//!
//! Every state-changing call is signed the only way the authority knows about:
//! the player's address travels in the caller header.

use alloy_primitives::Address;
use reqwest::{Client, RequestBuilder};
use rpsls_core::protocol::{
    AccountResponse, CreateGameRequest, CreateGameResponse, DepositRequest, ErrorResponse,
    GamesResponse, JoinGameRequest, RevealRequest, StatusResponse, CALLER_HEADER,
};
use rpsls_core::{GameId, GameView, ProtocolConfig, Settlement, TimeoutStatus};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors talking to the authority
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Authority unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authority rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
}

impl ClientError {
    /// Error code reported by the authority, if it answered at all
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { code, .. } => Some(code),
            ClientError::Transport(_) => None,
        }
    }
}

/// Client for the authority's HTTP API
#[derive(Clone, Debug)]
pub struct AuthorityClient {
    client: Client,
    base_url: String,
}

impl AuthorityClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn as_caller(&self, request: RequestBuilder, caller: Address) -> RequestBuilder {
        request.header(CALLER_HEADER, caller.to_string())
    }

    /// Send a request and decode either the success body or the error body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => (err.error, err.message),
            Err(_) => ("unknown".to_string(), body),
        };
        tracing::debug!(status = status.as_u16(), code = %code, "authority rejected request");

        Err(ClientError::Rejected {
            status: status.as_u16(),
            code,
            message,
        })
    }

    // Operations

    pub async fn create_game(
        &self,
        caller: Address,
        req: &CreateGameRequest,
    ) -> Result<CreateGameResponse, ClientError> {
        let request = self.client.post(self.url("/game/create")).json(req);
        self.send(self.as_caller(request, caller)).await
    }

    pub async fn join_game(
        &self,
        caller: Address,
        game_id: GameId,
        req: &JoinGameRequest,
    ) -> Result<StatusResponse, ClientError> {
        let request = self
            .client
            .post(self.url(&format!("/game/{}/join", game_id)))
            .json(req);
        self.send(self.as_caller(request, caller)).await
    }

    pub async fn reveal(
        &self,
        caller: Address,
        game_id: GameId,
        req: &RevealRequest,
    ) -> Result<Settlement, ClientError> {
        let request = self
            .client
            .post(self.url(&format!("/game/{}/reveal", game_id)))
            .json(req);
        self.send(self.as_caller(request, caller)).await
    }

    pub async fn player1_timeout(
        &self,
        caller: Address,
        game_id: GameId,
    ) -> Result<Settlement, ClientError> {
        let request = self
            .client
            .post(self.url(&format!("/game/{}/player1-timeout", game_id)));
        self.send(self.as_caller(request, caller)).await
    }

    pub async fn player2_timeout(
        &self,
        caller: Address,
        game_id: GameId,
    ) -> Result<Settlement, ClientError> {
        let request = self
            .client
            .post(self.url(&format!("/game/{}/player2-timeout", game_id)));
        self.send(self.as_caller(request, caller)).await
    }

    // Queries

    pub async fn game(&self, game_id: GameId) -> Result<GameView, ClientError> {
        let request = self.client.get(self.url(&format!("/game/{}", game_id)));
        self.send(request).await
    }

    pub async fn timeout_status(&self, game_id: GameId) -> Result<TimeoutStatus, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("/game/{}/timeout", game_id)));
        self.send(request).await
    }

    /// Every game `player` created or joined, most recent first
    pub async fn games_for(&self, player: Address) -> Result<Vec<GameView>, ClientError> {
        let request = self
            .client
            .get(self.url("/games"))
            .query(&[("player", player.to_string())]);
        let response: GamesResponse = self.send(request).await?;
        Ok(response.games)
    }

    pub async fn config(&self) -> Result<ProtocolConfig, ClientError> {
        self.send(self.client.get(self.url("/config"))).await
    }

    // Accounts

    pub async fn account(&self, address: Address) -> Result<AccountResponse, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("/account/{}", address)));
        self.send(request).await
    }

    pub async fn deposit(
        &self,
        address: Address,
        amount: u64,
    ) -> Result<AccountResponse, ClientError> {
        let request = self
            .client
            .post(self.url(&format!("/account/{}/deposit", address)))
            .json(&DepositRequest { amount });
        self.send(request).await
    }
}
