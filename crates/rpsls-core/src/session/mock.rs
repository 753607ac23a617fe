//! In-memory session ledger for testing.

use super::traits::{SessionError, SessionLedger, SessionRecord};
use crate::protocol::GameId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory session ledger
#[derive(Clone, Default)]
pub struct MemorySessionLedger {
    records: Arc<Mutex<HashMap<GameId, SessionRecord>>>,
}

impl MemorySessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<GameId, SessionRecord>> {
        // A panic while holding the lock cannot leave a half-written map entry.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionLedger for MemorySessionLedger {
    async fn put(&self, game_id: GameId, record: SessionRecord) -> Result<(), SessionError> {
        self.records().insert(game_id, record);
        Ok(())
    }

    async fn get(&self, game_id: GameId) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.records().get(&game_id).cloned())
    }

    async fn remove(&self, game_id: GameId) -> Result<(), SessionError> {
        self.records().remove(&game_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secret;
    use crate::games::Move;
    use alloy_primitives::Address;

    #[tokio::test]
    async fn test_put_then_get_returns_original() {
        let ledger = MemorySessionLedger::new();
        let game_id = GameId::new();
        let record = SessionRecord::new(
            Move::Spock,
            Secret::random(),
            Some(Address::with_last_byte(2)),
            50,
        );

        ledger.put(game_id, record.clone()).await.unwrap();

        assert_eq!(ledger.get(game_id).await.unwrap(), Some(record));
        assert_eq!(ledger.get(GameId::new()).await.unwrap(), None);
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let ledger = MemorySessionLedger::new();
        let game_id = GameId::new();
        let record = SessionRecord::new(Move::Rock, Secret::random(), None, 1);

        ledger.put(game_id, record).await.unwrap();
        ledger.remove(game_id).await.unwrap();

        assert!(ledger.is_empty());
        assert_eq!(ledger.get(game_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let ledger = MemorySessionLedger::new();
        let handle = ledger.clone();
        let game_id = GameId::new();

        handle
            .put(
                game_id,
                SessionRecord::new(Move::Paper, Secret::random(), None, 3),
            )
            .await
            .unwrap();

        assert!(ledger.get(game_id).await.unwrap().is_some());
    }
}
