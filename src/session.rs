use log::{ error, info };
use std::sync::Arc;

use crate::history::{ HistoryCompactor, HistoryError, HistoryStore };
use crate::llm::completion::CompletionClient;
use crate::llm::ModelChoice;
use crate::models::chat::{ Transcript, Turn };

/// One conversation: owns the transcript and drives complete → compact → persist.
pub struct ChatSession {
    client: CompletionClient,
    compactor: HistoryCompactor,
    store: Arc<dyn HistoryStore>,
    model: ModelChoice,
    transcript: Transcript,
}

impl ChatSession {
    /// Loads whatever history the store holds; an unusable file starts the session empty.
    pub async fn open(
        client: CompletionClient,
        compactor: HistoryCompactor,
        store: Arc<dyn HistoryStore>,
        model: ModelChoice
    ) -> Self {
        let transcript = store.load().await;
        info!("Session opened with {} stored turns, model {}", transcript.len(), model.display_name());
        Self { client, compactor, store, model, transcript }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn model(&self) -> ModelChoice {
        self.model
    }

    pub fn select_model(&mut self, model: ModelChoice) {
        if model != self.model {
            info!("Switching model from {} to {}", self.model.display_name(), model.display_name());
            self.model = model;
        }
    }

    /// Runs one exchange and returns the reply appended for this turn.
    /// The reply is final before compaction may replace the transcript.
    pub async fn send(&mut self, text: &str) -> String {
        self.transcript.push(Turn::user(text));

        let reply = self.client.complete(text, self.model).await.into_display_text();
        self.transcript.push(Turn::assistant(reply.clone()));

        let current = std::mem::take(&mut self.transcript);
        self.transcript = self.compactor.maybe_compact(current, self.model).await;

        if let Err(e) = self.store.save(&self.transcript).await {
            error!("Failed to persist chat history: {}", e);
        }
        reply
    }

    pub async fn clear(&mut self) -> Result<(), HistoryError> {
        self.transcript.clear();
        self.store.clear().await
    }
}
