use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::together::{ CompletionBackend, CompletionChoice, CompletionRequest, CompletionResponse };
use super::{ LlmError, ModelChoice };

/// Replays queued outcomes and records every request it receives.
/// Once the script runs out, every call fails with a 503 unless a fallback reply is set.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, u16>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, status: u16) -> Self {
        self.script.lock().unwrap().push_back(Err(status));
        self
    }

    pub fn always(mut self, text: &str) -> Self {
        self.fallback = Some(text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn build_request(&self, model: ModelChoice, prompt: String) -> CompletionRequest {
        CompletionRequest {
            model: model.id().to_string(),
            prompt,
            max_rpm: 60,
            temperature: 0.5,
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        let outcome = next.unwrap_or_else(|| self.fallback.clone().ok_or(503));
        match outcome {
            Ok(text) => Ok(CompletionResponse { choices: vec![CompletionChoice { text }] }),
            Err(status) => Err(LlmError::Status(status)),
        }
    }
}
