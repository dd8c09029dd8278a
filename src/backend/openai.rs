use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace, warn};

use super::client::{CompletionParams, LLMClient};
use super::utils::{check_response_status, handle_http_error};
use crate::error::{AdvisorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.opentyphoon.ai/v1";
pub const DEFAULT_MODEL: &str = "typhoon-v2.1-12b-instruct";
pub const API_KEY_ENV: &str = "TYPHOON_API_KEY";
pub const BASE_URL_ENV: &str = "TYPHOON_API_URL";

/// Persona and safety rules sent as the system message of every request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a preliminary health assistant. Speak gently, politely and warmly. \
Greet the user only in your first message, never again. Never diagnose a disease and never recommend or prescribe \
medication. Always advise the user to see a doctor.";

const PROVIDER: &str = "OpenAI-compatible";

/// Configuration for [`OpenAICompatibleClient`]
#[derive(Debug, Clone)]
pub struct OpenAICompatibleConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub timeout: Option<Duration>,
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
pub struct OpenAICompatibleClient {
    config: OpenAICompatibleConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ResponseMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

impl OpenAICompatibleClient {
    /// Create a client with the default endpoint, model and system prompt.
    #[instrument(name = "openai_compatible_client_new", skip(api_key))]
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AdvisorError::ConfigError("API key cannot be empty".to_string()));
        }
        info!("Creating new OpenAI-compatible client");
        trace!("API key length: {}", api_key.len());

        let config = OpenAICompatibleConfig {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            timeout: None,
        };

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    /// Create a client from `TYPHOON_API_KEY` (required) and `TYPHOON_API_URL` (optional).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            AdvisorError::ConfigError(format!("{} environment variable is not set", API_KEY_ENV))
        })?;
        let client = Self::new(api_key)?;
        Ok(match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => client.base_url(url),
            _ => client,
        })
    }

    pub fn config(&self) -> &OpenAICompatibleConfig {
        &self.config
    }

    #[instrument(skip(self))]
    pub fn model(mut self, model: impl Into<String> + std::fmt::Debug) -> Self {
        let model = model.into();
        debug!(previous_model = %self.config.model, new_model = %model, "Setting model");
        self.config.model = model;
        self
    }

    /// Base URL up to (not including) `/chat/completions`.
    #[instrument(skip(self))]
    pub fn base_url(mut self, base_url: impl Into<String> + std::fmt::Debug) -> Self {
        let base_url = base_url.into();
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        debug!(base_url = %self.config.base_url, "Setting base URL");
        self
    }

    /// Replace the system message; `None` sends only the user prompt.
    pub fn system_prompt(mut self, system_prompt: Option<String>) -> Self {
        debug!(enabled = system_prompt.is_some(), "Setting system prompt");
        self.config.system_prompt = system_prompt;
        self
    }

    /// Set the timeout applied to each HTTP request.
    #[instrument(skip(self))]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        debug!(previous_timeout = ?self.config.timeout, new_timeout = ?timeout, "Setting timeout");
        self.config.timeout = Some(timeout);
        self
    }

    /// Finish configuration and build the underlying HTTP client.
    #[instrument(skip(self))]
    pub fn build(mut self) -> Self {
        info!(
            model = %self.config.model,
            base_url = %self.config.base_url,
            timeout = ?self.config.timeout,
            "OpenAI-compatible client configuration complete"
        );

        let mut client_builder = reqwest::Client::builder();
        if let Some(timeout) = self.config.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        self.client = client_builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build reqwest client with timeout, using default");
            reqwest::Client::new()
        });

        self
    }

    fn build_request(&self, prompt: &str, params: &CompletionParams) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.config.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.to_string(),
        });

        ChatCompletionRequest {
            model: params
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

fn first_content(completion: ChatCompletionResponse) -> Result<String> {
    let Some(choice) = completion.choices.into_iter().next() else {
        error!("Completion response has an empty choices array");
        return Err(AdvisorError::ApiError(
            "No completion choices returned".to_string(),
        ));
    };
    trace!(finish_reason = ?choice.finish_reason, "Completion finish reason");

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => {
            error!("No content in completion response");
            Err(AdvisorError::ApiError("No content in response".to_string()))
        }
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    #[instrument(
        name = "openai_compatible_complete",
        skip(self, prompt, params),
        fields(
            model = %params.model.as_deref().unwrap_or(&self.config.model),
            prompt_len = prompt.len()
        )
    )]
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String> {
        let request = self.build_request(prompt, params);

        debug!("Sending chat completion request");
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| handle_http_error(e, PROVIDER))?;

        let response = check_response_status(response, PROVIDER).await?;
        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse chat completion response");
            handle_http_error(e, PROVIDER)
        })?;

        let content = first_content(completion)?;
        debug!(content_len = content.len(), "Received completion");
        Ok(content)
    }
}
