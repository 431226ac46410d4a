use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cli::Args;
use crate::history::CompactionPolicy;
use crate::llm::completion::RetryPolicy;
use crate::llm::{ LlmConfig, ModelChoice };

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOGETHER_API_KEY is not set; provide it via the environment or a .env file")]
    MissingApiKey,

    #[error("{0}")]
    UnknownModel(String),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid server address '{0}'")]
    InvalidAddr(String),

    #[error("MAX_RETRIES must allow at least one attempt")]
    NoAttempts,
}

/// Validated settings shared by the chat and serve processes.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub model: ModelChoice,
    pub retry: RetryPolicy,
    pub cache_capacity: usize,
    pub compaction: CompactionPolicy,
    pub history_path: String,
    pub server_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_key = args.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = parse_url(&args.api_base_url)?;
        let model = args.model
            .parse::<ModelChoice>()
            .map_err(|e| ConfigError::UnknownModel(e.to_string()))?;
        if args.max_retries == 0 {
            return Err(ConfigError::NoAttempts);
        }
        let server_addr = args.server_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr(args.server_addr.clone()))?;

        Ok(Self {
            llm: LlmConfig {
                api_key,
                base_url: base_url.to_string(),
                temperature: args.temperature,
                max_rpm: args.max_rpm,
                request_timeout: Duration::from_secs(args.request_timeout_secs),
            },
            model,
            retry: RetryPolicy {
                max_attempts: args.max_retries,
                delay: Duration::from_secs(args.retry_delay_secs),
            },
            cache_capacity: args.cache_capacity,
            compaction: CompactionPolicy {
                max_turns: args.compact_threshold,
                min_summary_chars: args.summary_min_chars,
            },
            history_path: args.history_path.clone(),
            server_addr,
        })
    }
}

pub fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
