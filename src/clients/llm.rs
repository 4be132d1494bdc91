//! LLM backend client for generating summaries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use crate::core::config::{AppConfig, OPENAI_API_VERSION};
use crate::errors::GatewayError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One completion request against the summarization backend.
///
/// Implementations must not retry on their own; failures propagate to the
/// caller immediately.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GatewayError>;
}

/// Azure OpenAI chat-completions client.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.openai_api_key.clone(),
            endpoint: config.openai_endpoint.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.model, OPENAI_API_VERSION
        )
    }
}

#[async_trait]
impl LlmBackend for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GatewayError> {
        info!(model = %self.model, max_tokens, "requesting completion");

        let request_body = json!({
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content }
            ],
            "max_tokens": max_tokens,
            "temperature": temperature
        });

        let response = self
            .http
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GatewayError::Http(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::Backend(format!("{status}: {error_text}")));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Backend(format!("failed to parse response: {e}")))?;

        response_json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Backend("no content in response".to_string()))
    }
}
