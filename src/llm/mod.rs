pub mod completion;
pub mod together;
#[cfg(test)]
pub(crate) mod mock;

use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TOGETHER_API_URL: &str = "https://api.together.xyz/v1/completions";

/// Models the chatbot knows how to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free")]
    Llama33Turbo,
    #[serde(rename = "Qwen/Qwen2-72B-Instruct")]
    Qwen2Instruct,
    #[serde(rename = "mistralai/Mixtral-8x7B-Instruct-v0.1")]
    Mixtral8x7bInstruct,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 3] = [
        ModelChoice::Llama33Turbo,
        ModelChoice::Qwen2Instruct,
        ModelChoice::Mixtral8x7bInstruct,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ModelChoice::Llama33Turbo => "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free",
            ModelChoice::Qwen2Instruct => "Qwen/Qwen2-72B-Instruct",
            ModelChoice::Mixtral8x7bInstruct => "mistralai/Mixtral-8x7B-Instruct-v0.1",
        }
    }

    /// Last path segment of the identifier, e.g. `Qwen2-72B-Instruct`.
    pub fn display_name(&self) -> &'static str {
        let id = self.id();
        id.rsplit('/').next().unwrap_or(id)
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseModelError {
    message: String,
}

impl fmt::Display for ParseModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseModelError {}

impl FromStr for ModelChoice {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ModelChoice::ALL.iter()
            .copied()
            .find(|m| {
                m.id().to_lowercase() == wanted || m.display_name().to_lowercase() == wanted
            })
            .ok_or_else(|| ParseModelError {
                message: format!("Unknown model: '{}'", s),
            })
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion endpoint returned status {0}")]
    Status(u16),

    #[error("could not decode completion response: {0}")]
    Decode(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

/// Settings for talking to the remote completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_rpm: u32,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_TOGETHER_API_URL.to_string(),
            temperature: 0.5,
            max_rpm: 60,
            request_timeout: Duration::from_secs(60),
        }
    }
}
