use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to extract text from document: {0}")]
    Extraction(String),

    #[error("Summarization backend call failed: {0}")]
    Backend(String),

    #[error("Failed to translate text: {0}")]
    Translation(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid custom prompt: {0}")]
    Prompt(String),

    #[error("Failed to send HTTP request: {0}")]
    Http(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::Http(error.to_string())
    }
}
