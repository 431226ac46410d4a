use reqwest::Client as HttpClient;
use std::error::Error;

use crate::config::parse_url;
use crate::models::api::{ QueryRequest, QueryResponse };

/// Talks to a running `/chat` endpoint; the only coupling between processes.
pub struct EndpointClient {
    http: HttpClient,
    chat_url: String,
}

impl EndpointClient {
    pub fn new(api_url: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_url = parse_url(api_url)?.join("chat")?;
        Ok(Self {
            http: HttpClient::new(),
            chat_url: chat_url.to_string(),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub async fn ask(&self, query: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let resp = self.http
            .post(&self.chat_url)
            .json(&QueryRequest { query: query.to_string() })
            .send()
            .await?
            .error_for_status()?
            .json::<QueryResponse>()
            .await?;
        Ok(resp.response)
    }
}
