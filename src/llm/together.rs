use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };

use super::{ LlmConfig, LlmError, ModelChoice };

/// Body of a single call to the text-completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_rpm: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    /// Text of the first choice, empty when the endpoint returned none.
    pub fn first_text(&self) -> &str {
        self.choices.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// One request/response exchange with a completion endpoint. No retries here.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn build_request(&self, model: ModelChoice, prompt: String) -> CompletionRequest;

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

pub struct TogetherClient {
    http: HttpClient,
    base_url: String,
    temperature: f32,
    max_rpm: u32,
}

impl TogetherClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| LlmError::InvalidHeader(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            temperature: config.temperature,
            max_rpm: config.max_rpm,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionBackend for TogetherClient {
    fn build_request(&self, model: ModelChoice, prompt: String) -> CompletionRequest {
        CompletionRequest {
            model: model.id().to_string(),
            prompt,
            max_rpm: self.max_rpm,
            temperature: self.temperature,
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!("POST {} (model={})", self.base_url, request.model);
        let resp = self.http.post(&self.base_url).json(request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LlmError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice::<CompletionResponse>(&bytes).map_err(|e| LlmError::Decode(e.to_string()))
    }
}
