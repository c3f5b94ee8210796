//! Chat-completion backed ad copy generation
//!
//! Speaks the widely used `/v1/chat/completions` JSON shape: a model name,
//! a system + user message pair, temperature and a token bound in; a list
//! of choices out, of which the first message is used.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ContentError;
use crate::generator::TextGenerator;

const SERVICE: &str = "Chat completion";

/// Default chat-completion endpoint
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_INSTRUCTION: &str = "You are an expert advertising copywriter. \
You are good at conveying the appeal of a product briefly and precisely.";

/// Chat-completion client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_CHAT_ENDPOINT.to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    150
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Build the user prompt for a scene
pub fn build_prompt(scene_description: &str) -> String {
    format!(
        "Write advertising copy that suits the following scene.\n\
         Make the first line a catchy title, followed by a short description.\n\
         Keep the whole ad within 2-3 lines.\n\
         \n\
         Scene description: {}",
        scene_description
    )
}

/// Delivers a chat-completion request
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ContentError>;
}

/// HTTPS transport using reqwest
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ContentError> {
        debug!(endpoint = %self.endpoint, model = %request.model, "Sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = %status, "Chat completion returned non-success status");
            return Err(ContentError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Ad copy from a hosted language model
pub struct ChatTextGenerator<T = HttpChatTransport> {
    transport: T,
    api_key: String,
    config: ChatConfig,
}

impl ChatTextGenerator<HttpChatTransport> {
    /// Generator talking HTTPS to `config.endpoint`
    pub fn from_config(config: ChatConfig, api_key: impl Into<String>) -> Result<Self, ContentError> {
        let transport = HttpChatTransport::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::new(transport, config, api_key))
    }
}

impl<T: ChatTransport> ChatTextGenerator<T> {
    pub fn new(transport: T, config: ChatConfig, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            config,
        }
    }

    pub fn request_for(&self, scene_description: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(build_prompt(scene_description)),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl<T: ChatTransport> TextGenerator for ChatTextGenerator<T> {
    async fn generate_ad(&self, scene_description: &str) -> Result<String, ContentError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(ContentError::MissingCredential { service: SERVICE });
        }

        let request = self.request_for(scene_description);
        let response = self.transport.complete(api_key, &request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(ContentError::EmptyResponse(SERVICE))?;

        info!(lines = content.lines().count(), "Generated ad copy");
        Ok(content)
    }
}
