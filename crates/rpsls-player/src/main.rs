//! RPSLS Player Agent Service

use alloy_primitives::Address;
use rand::RngCore;
use rpsls_core::FileSessionLedger;
use rpsls_player::{create_router, AuthorityClient, PlayerState};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn player_address() -> Address {
    if let Ok(raw) = std::env::var("PLAYER_ADDRESS") {
        match Address::from_str(raw.trim()) {
            Ok(address) => return address,
            Err(err) => tracing::warn!(error = %err, "ignoring invalid PLAYER_ADDRESS"),
        }
    }
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    Address::from(bytes)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let address = player_address();
    let authority_url =
        std::env::var("AUTHORITY_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let session_dir =
        std::env::var("SESSION_DIR").unwrap_or_else(|_| ".rpsls-sessions".to_string());

    let client = AuthorityClient::new(authority_url);
    match client.config().await {
        Ok(config) => tracing::info!(
            timeout_window_secs = config.timeout_window_secs,
            open_join = config.open_join,
            "connected to authority"
        ),
        Err(err) => tracing::warn!(url = %client.base_url(), error = %err, "authority not reachable yet"),
    }

    tracing::info!("Player address: {}", address);
    tracing::info!("Session records in {}", session_dir);

    let sessions = Arc::new(FileSessionLedger::new(session_dir));
    let state = Arc::new(PlayerState::new(address, client, sessions));
    let app = create_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Player service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
