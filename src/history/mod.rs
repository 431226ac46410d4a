pub mod compaction;
pub mod json_file;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::models::chat::Transcript;

pub use compaction::{ CompactionPolicy, HistoryCompactor };
pub use json_file::JsonFileHistoryStore;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whole-transcript persistence. `load` never fails: anything unreadable is an empty history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> Transcript;

    async fn save(&self, transcript: &Transcript) -> Result<(), HistoryError>;

    async fn clear(&self) -> Result<(), HistoryError> {
        self.save(&Transcript::new()).await
    }
}

pub fn initialize_history_store(path: &str) -> Arc<dyn HistoryStore> {
    info!("Chat history will be stored in: {}", path);
    Arc::new(JsonFileHistoryStore::new(path))
}

/// Renders turns as `User: ...` / `Assistant: ...`, space separated.
pub fn format_transcript(transcript: &Transcript) -> String {
    transcript
        .turns()
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Turn;

    #[test]
    fn formats_turns_in_order_with_labels() {
        let transcript = Transcript::from(vec![
            Turn::user("hi"),
            Turn::assistant("hello"),
            Turn::assistant("again"),
        ]);
        assert_eq!(format_transcript(&transcript), "User: hi Assistant: hello Assistant: again");
    }

    #[test]
    fn empty_transcript_formats_to_empty_string() {
        assert_eq!(format_transcript(&Transcript::new()), "");
    }
}
