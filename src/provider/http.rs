//! OpenAI-compatible HTTP provider client

use super::{ChatOutcome, ClientError, ProviderClient};
use crate::config::{ApiConfig, ProviderSpec};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Client for any backend speaking the chat-completions wire format
pub struct HttpClient {
    name: String,
    model: String,
    base_url: String,
    api_key: String,
    cost_per_token: f64,
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(spec: &Arc<ProviderSpec>, api: &ApiConfig) -> Result<Self> {
        let api_key = std::env::var(&api.api_key_env).map_err(|_| {
            Error::config(format!(
                "Provider {}: environment variable {} is not set",
                spec.name, api.api_key_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpClient {
            name: spec.name.clone(),
            model: spec.model.clone(),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key,
            cost_per_token: spec.cost_per_token,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

#[async_trait]
impl ProviderClient for HttpClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> std::result::Result<ChatOutcome, ClientError> {
        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();
        debug!(provider = %self.name, %url, "dispatching chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ClientError::Other(format!("request failed: {}", e)))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited(format!(
                "{} returned 429",
                self.name
            )));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Other(format!(
                "upstream error ({}): {}",
                status, body
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Other(format!("malformed response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::Other("no content in response".to_string()))?;

        let total_tokens = body.usage.map(|u| u.total_tokens).unwrap_or(0);

        Ok(ChatOutcome {
            content,
            latency_ms: start.elapsed().as_millis() as u64,
            cost: total_tokens as f64 * self.cost_per_token,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u64,
}
