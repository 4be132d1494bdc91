use std::env;

use crate::errors::GatewayError;
use crate::gate::DEFAULT_MAX_CONCURRENT_CALLS;
use crate::summarizer::DEFAULT_CONTEXT_WINDOW_TOKENS;

/// Azure OpenAI API version used for chat completions.
pub const OPENAI_API_VERSION: &str = "2024-02-15-preview";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_endpoint: String,
    pub openai_model: String,
    pub translator_key: Option<String>,
    pub translator_endpoint: Option<String>,
    pub translator_region: Option<String>,
    pub context_window_tokens: usize,
    pub max_concurrent_calls: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        Ok(Self {
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_endpoint: require("OPENAI_API_BASE")?,
            openai_model: env::var("OPENAI_MODEL_NAME").unwrap_or_else(|_| "gpt-4o".to_string()),
            translator_key: env::var("AZURE_TRANSLATOR_KEY").ok(),
            translator_endpoint: env::var("AZURE_TRANSLATOR_ENDPOINT").ok(),
            translator_region: env::var("AZURE_TRANSLATOR_REGION").ok(),
            context_window_tokens: parse_or(
                "CONTEXT_WINDOW_TOKENS",
                DEFAULT_CONTEXT_WINDOW_TOKENS,
            )?,
            max_concurrent_calls: parse_or("MAX_CONCURRENT_CALLS", DEFAULT_MAX_CONCURRENT_CALLS)?,
        })
    }
}

fn require(name: &str) -> Result<String, GatewayError> {
    env::var(name).map_err(|_| GatewayError::Configuration(format!("{name} is not set")))
}

fn parse_or(name: &str, default: usize) -> Result<usize, GatewayError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| GatewayError::Configuration(format!("{name} is not a valid number"))),
        Err(_) => Ok(default),
    }
}
