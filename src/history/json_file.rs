use async_trait::async_trait;
use log::{ debug, warn };
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };

use super::{ HistoryError, HistoryStore };
use crate::models::chat::{ ChatHistoryDocument, Transcript };

/// Stores the transcript as `{"chat_history": [...]}`, rewriting the file on every save.
/// There is no locking; one writer per file is assumed.
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn load(&self) -> Transcript {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history file at {}, starting empty", self.path.display());
                return Transcript::new();
            }
            Err(e) => {
                warn!("Could not read history file {}: {}", self.path.display(), e);
                return Transcript::new();
            }
        };

        match serde_json::from_str::<ChatHistoryDocument>(&raw) {
            Ok(doc) => doc.chat_history,
            Err(e) => {
                warn!("Ignoring malformed history file {}: {}", self.path.display(), e);
                Transcript::new()
            }
        }
    }

    async fn save(&self, transcript: &Transcript) -> Result<(), HistoryError> {
        let doc = ChatHistoryDocument { chat_history: transcript.clone() };
        let body = serde_json::to_vec(&doc)?;
        tokio::fs::write(&self.path, body).await?;
        debug!("Saved {} turns to {}", transcript.len(), self.path.display());
        Ok(())
    }
}
