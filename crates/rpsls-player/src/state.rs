//! Player agent state.

use alloy_primitives::Address;
use rpsls_core::SessionLedger;
use std::sync::Arc;

use crate::client::AuthorityClient;

/// One player's identity, its link to the authority and its session records
pub struct PlayerState {
    pub address: Address,
    pub client: AuthorityClient,
    pub sessions: Arc<dyn SessionLedger>,
}

impl PlayerState {
    pub fn new(address: Address, client: AuthorityClient, sessions: Arc<dyn SessionLedger>) -> Self {
        Self {
            address,
            client,
            sessions,
        }
    }
}
