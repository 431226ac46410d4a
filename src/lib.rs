pub mod cache;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod repl;
pub mod server;
pub mod session;

use cache::ResponseCache;
use cli::{ Args, Command };
use config::AppConfig;
use history::{ initialize_history_store, HistoryCompactor };
use llm::completion::CompletionClient;
use llm::together::TogetherClient;
use log::info;
use server::{ EndpointClient, Server };
use session::ChatSession;
use std::error::Error;
use std::sync::Arc;

fn log_configuration(config: &AppConfig) {
    info!("--- Core Configuration ---");
    info!("Completion Endpoint: {}", config.llm.base_url);
    info!("Model: {}", config.model.id());
    info!("Temperature: {}", config.llm.temperature);
    info!("Max RPM Hint: {}", config.llm.max_rpm);
    info!("Retry Attempts: {}", config.retry.max_attempts);
    info!("Retry Delay: {:?}", config.retry.delay);
    info!("Cache Capacity: {}", config.cache_capacity);
    info!("History Path: {}", config.history_path);
    info!("Compaction Threshold: {} turns", config.compaction.max_turns);
    info!("-------------------------");
}

fn build_client(config: &AppConfig) -> Result<CompletionClient, Box<dyn Error + Send + Sync>> {
    let backend = Arc::new(TogetherClient::new(&config.llm)?);
    Ok(CompletionClient::new(backend, config.retry, ResponseCache::new(config.cache_capacity)))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match &args.command {
        Command::Ask { query } => {
            let endpoint = EndpointClient::new(&args.api_url)?;
            info!("Asking {}", endpoint.chat_url());
            println!("{}", endpoint.ask(query).await?);
            Ok(())
        }
        Command::Clear => {
            initialize_history_store(&args.history_path).clear().await?;
            println!("Chat history cleared.");
            Ok(())
        }
        Command::Chat => {
            let config = AppConfig::from_args(&args)?;
            log_configuration(&config);

            let client = build_client(&config)?;
            let compactor = HistoryCompactor::new(client.backend(), config.compaction);
            let store = initialize_history_store(&config.history_path);
            let mut session = ChatSession::open(client, compactor, store, config.model).await;

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run(&mut session, stdin, tokio::io::stdout()).await?;
            Ok(())
        }
        Command::Serve => {
            let config = AppConfig::from_args(&args)?;
            log_configuration(&config);

            let client = build_client(&config)?;
            info!("Starting server on: {}", config.server_addr);
            Server::new(config.server_addr, client, config.model).run().await
        }
    }
}
