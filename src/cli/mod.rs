use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    // --- Completion Provider Args ---
    /// API key for the completion provider. Never stored or logged.
    #[arg(long, env = "TOGETHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Full URL of the text completion endpoint.
    #[arg(long, env = "TOGETHER_API_URL", default_value = crate::llm::DEFAULT_TOGETHER_API_URL)]
    pub api_base_url: String,

    /// Model to use, by full identifier or display name (e.g. Qwen2-72B-Instruct)
    #[arg(long, env = "CHAT_MODEL", default_value = "Llama-3.3-70B-Instruct-Turbo-Free")]
    pub model: String,

    /// Sampling temperature sent with every request.
    #[arg(long, env = "TEMPERATURE", default_value = "0.5")]
    pub temperature: f32,

    /// Requests-per-minute hint forwarded to the provider.
    #[arg(long, env = "MAX_RPM", default_value = "60")]
    pub max_rpm: u32,

    /// Total attempts per chat completion, the first included.
    #[arg(long, env = "MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    /// Seconds to wait between failed attempts.
    #[arg(long, env = "RETRY_DELAY_SECS", default_value = "5")]
    pub retry_delay_secs: u64,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    pub request_timeout_secs: u64,

    /// Maximum number of cached replies kept in memory.
    #[arg(long, env = "CACHE_CAPACITY", default_value = "100")]
    pub cache_capacity: usize,

    // --- History Args ---
    /// JSON file holding the chat history.
    #[arg(long, env = "HISTORY_PATH", default_value = "db.json")]
    pub history_path: String,

    /// Compact the history once it holds more turns than this.
    #[arg(long, env = "COMPACT_THRESHOLD", default_value = "10")]
    pub compact_threshold: usize,

    /// Histories shorter than this many characters are kept verbatim as the summary.
    #[arg(long, env = "SUMMARY_MIN_CHARS", default_value = "50")]
    pub summary_min_chars: usize,

    // --- Server Args ---
    /// Host address and port for the HTTP endpoint to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8000")]
    pub server_addr: String,

    /// Base URL of a running endpoint, used by `ask`.
    #[arg(long, env = "API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive chat in the terminal, with persisted history.
    Chat,
    /// Serve POST /chat for other clients.
    Serve,
    /// Send one query to a running endpoint and print the reply.
    Ask {
        /// Query text; may be empty.
        #[arg(default_value = "")]
        query: String,
    },
    /// Wipe the stored chat history.
    Clear,
}
