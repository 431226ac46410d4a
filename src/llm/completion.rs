use log::{ debug, info, warn };
use std::sync::Arc;
use std::time::Duration;

use super::together::CompletionBackend;
use super::ModelChoice;
use crate::cache::{ CacheKey, ResponseCache };

pub const SYSTEM_PROMPT: &str =
    "You are a professional AI assistant. Provide clear and informative answers in a formal tone.";

/// Speaker label that opens a user turn in the prompt template. Replies are cut
/// at its first occurrence so the model cannot continue the dialogue on its own.
/// Known defect: a reply that legitimately mentions "User" is truncated too.
pub const TURN_DELIMITER: &str = "User";

pub const BUSY_MESSAGE: &str = "The server is too busy. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Text(String),
    Failure(String),
}

impl CompletionResult {
    /// What the user gets to see, whichever way the call went.
    pub fn into_display_text(self) -> String {
        match self {
            CompletionResult::Text(text) => text,
            CompletionResult::Failure(reason) => reason,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CompletionResult::Failure(_))
    }
}

/// Fixed-delay retry budget. `max_attempts` counts every attempt, the first included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

pub fn build_chat_prompt(prompt: &str) -> String {
    format!("{}\nUser: {}\nAssistant:", SYSTEM_PROMPT, prompt)
}

pub fn extract_reply(raw: &str) -> String {
    raw.split(TURN_DELIMITER).next().unwrap_or("").trim().to_string()
}

#[derive(Clone)]
pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
    cache: ResponseCache,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, retry: RetryPolicy, cache: ResponseCache) -> Self {
        Self { backend, retry, cache }
    }

    pub fn backend(&self) -> Arc<dyn CompletionBackend> {
        Arc::clone(&self.backend)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub async fn complete(&self, prompt: &str, model: ModelChoice) -> CompletionResult {
        let key = CacheKey::new(prompt, model);
        if let Some(hit) = self.cache.get(&key).await {
            debug!("Cache hit for {} ({} chars)", model.display_name(), prompt.len());
            return CompletionResult::Text(hit);
        }

        let request = self.backend.build_request(model, build_chat_prompt(prompt));
        let attempts = self.retry.max_attempts;

        for attempt in 1..=attempts {
            match self.backend.send(&request).await {
                Ok(resp) => {
                    let reply = extract_reply(resp.first_text());
                    info!("Completion from {} on attempt {}/{}", model.display_name(), attempt, attempts);
                    self.cache.insert(key, reply.clone()).await;
                    return CompletionResult::Text(reply);
                }
                Err(e) => {
                    warn!("Completion attempt {}/{} failed: {}", attempt, attempts, e);
                    if attempt < attempts {
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
            }
        }

        warn!("Giving up on completion after {} attempts", attempts);
        CompletionResult::Failure(BUSY_MESSAGE.to_string())
    }
}
