use log::{ info, warn };
use std::sync::Arc;

use super::format_transcript;
use crate::llm::together::CompletionBackend;
use crate::llm::ModelChoice;
use crate::models::chat::{ Transcript, Turn };

pub const SUMMARY_FAILED: &str = "Failed to generate summary.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionPolicy {
    /// Compaction runs once the transcript holds more turns than this.
    pub max_turns: usize,
    /// Rendered histories shorter than this (in chars) become the summary verbatim.
    pub min_summary_chars: usize,
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            max_turns: 10,
            min_summary_chars: 50,
        }
    }
}

pub fn build_summary_prompt(text: &str) -> String {
    format!("Summarize the following conversation, keeping the context clear:\n{}\nSummary:", text)
}

/// Collapses a long transcript into a single assistant turn holding a summary.
pub struct HistoryCompactor {
    backend: Arc<dyn CompletionBackend>,
    policy: CompactionPolicy,
}

impl HistoryCompactor {
    pub fn new(backend: Arc<dyn CompletionBackend>, policy: CompactionPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> CompactionPolicy {
        self.policy
    }

    pub async fn maybe_compact(&self, transcript: Transcript, model: ModelChoice) -> Transcript {
        if transcript.len() <= self.policy.max_turns {
            return transcript;
        }

        info!("Compacting history of {} turns", transcript.len());
        let summary = self.summarize(&transcript, model).await;
        Transcript::from(vec![Turn::assistant(summary)])
    }

    async fn summarize(&self, transcript: &Transcript, model: ModelChoice) -> String {
        let text = format_transcript(transcript);
        if text.chars().count() < self.policy.min_summary_chars {
            return text;
        }

        // Single attempt; the retry loop is reserved for user-facing replies.
        let request = self.backend.build_request(model, build_summary_prompt(&text));
        match self.backend.send(&request).await {
            Ok(resp) => resp.first_text().trim().to_string(),
            Err(e) => {
                warn!("Summary request failed: {}", e);
                SUMMARY_FAILED.to_string()
            }
        }
    }
}
