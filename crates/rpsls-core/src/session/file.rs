//! File-backed session ledger: one JSON document per game.

use super::traits::{SessionError, SessionLedger, SessionRecord};
use crate::protocol::GameId;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Stores each record as `<dir>/game_<id>.json`.
///
/// Writes go to a temporary file that is renamed into place, so a crash never
/// leaves a truncated record behind.
#[derive(Clone, Debug)]
pub struct FileSessionLedger {
    dir: PathBuf,
}

impl FileSessionLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, game_id: GameId) -> PathBuf {
        self.dir.join(format!("game_{}.json", game_id))
    }
}

#[async_trait]
impl SessionLedger for FileSessionLedger {
    async fn put(&self, game_id: GameId, record: SessionRecord) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(game_id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&record)?;

        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;
        tracing::debug!(game_id = %game_id, path = %path.display(), "session record stored");
        Ok(())
    }

    async fn get(&self, game_id: GameId) -> Result<Option<SessionRecord>, SessionError> {
        match fs::read(self.path_for(game_id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn remove(&self, game_id: GameId) -> Result<(), SessionError> {
        match fs::remove_file(self.path_for(game_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
