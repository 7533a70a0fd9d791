//! @ai:module:intent Direct client for OpenAI-compatible chat completion APIs
//! @ai:module:layer infrastructure
//! @ai:module:public_api DirectApiClient, DirectApiSettings
//! @ai:module:stateless false

use crate::error::ClientError;
use crate::runner::client::{with_timeout, Completion, Meta, ModelClient, Outcome};
use crate::runner::rate_limiter::RateLimiter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};

/// @ai:intent Connection settings for a direct API backend
#[derive(Debug, Clone)]
pub struct DirectApiSettings {
    pub model: String,
    pub base_url: String,
    pub provider: String,
    pub timeout: Duration,
    pub requests_per_minute: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    /// Reasoning trace exposed by thinking models
    #[serde(default)]
    thinking: Option<String>,
}

/// @ai:intent Calls a remote chat completions endpoint directly
pub struct DirectApiClient {
    client: reqwest::Client,
    settings: DirectApiSettings,
    api_key: Option<String>,
    rate_limiter: RateLimiter,
}

impl DirectApiClient {
    /// @ai:intent Create a client reading its bearer token from an environment variable
    /// @ai:post a missing variable is reported on each call, not here
    /// @ai:effects env
    pub fn from_env(settings: DirectApiSettings, api_key_env: &str) -> Result<Self, ClientError> {
        let api_key = std::env::var(api_key_env).ok();

        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; calls to {} will fail",
                api_key_env,
                settings.model
            );
        }

        Self::new(settings, api_key)
    }

    /// @ai:intent Create a client with an explicit key
    /// @ai:effects pure
    pub fn new(settings: DirectApiSettings, api_key: Option<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        let rate_limiter = RateLimiter::new(settings.requests_per_minute);

        Ok(Self {
            client,
            settings,
            api_key,
            rate_limiter,
        })
    }

    /// @ai:intent Perform the HTTP exchange
    /// @ai:effects network
    async fn complete(&self, prompt: &str) -> Result<Completion, ClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ClientError::Config("missing API key".to_string()))?;

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(self.settings.timeout)
                } else {
                    ClientError::from(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::Protocol(format!("API error: {} - {}", status, error_text)));
        }

        let body: ChatResponse = response.json().await?;
        let message = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ClientError::Protocol("response has no choices".to_string()))?;

        let mut meta = Meta::new();
        meta.insert("model".to_string(), json!(self.settings.model));
        meta.insert("provider".to_string(), json!(self.settings.provider));
        meta.insert("usage".to_string(), body.usage.unwrap_or_else(|| json!({})));
        if let Some(reasoning) = message.thinking {
            meta.insert("reasoning".to_string(), json!(reasoning));
        }

        Ok(Completion {
            text: message.content.unwrap_or_default(),
            meta,
        })
    }
}

#[async_trait]
impl ModelClient for DirectApiClient {
    /// @ai:intent Send the prompt, converting every failure into an outcome
    /// @ai:effects network
    async fn invoke(&self, prompt: &str) -> Outcome {
        self.rate_limiter.acquire().await;

        let started = Instant::now();
        let result = with_timeout(self.settings.timeout, self.complete(prompt)).await;

        if let Err(e) = &result {
            tracing::warn!("{} call failed: {}", self.settings.model, e);
        }

        Outcome::from_call(result, started)
    }
}
