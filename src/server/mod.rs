pub mod api;
pub mod client;

use crate::llm::completion::CompletionClient;
use crate::llm::ModelChoice;
use std::error::Error;
use std::net::SocketAddr;

pub use client::EndpointClient;

pub struct Server {
    addr: SocketAddr,
    client: CompletionClient,
    model: ModelChoice,
}

impl Server {
    pub fn new(addr: SocketAddr, client: CompletionClient, model: ModelChoice) -> Self {
        Self { addr, client, model }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let state = api::AppState {
            client: self.client.clone(),
            model: self.model,
        };
        api::start_http_server(self.addr, state).await
    }
}
