use thiserror::Error;
use vulnrag_core::Error as CoreError;

/// Chat model errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid model configuration: {0}")]
    ConfigError(String),

    #[error("Chat request failed: {0}")]
    RequestFailed(String),

    #[error("Chat API returned error {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Failed to parse chat response: {0}")]
    ParseError(String),
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ConfigError(msg) => CoreError::config(msg),
            other => CoreError::with_context("Chat model call failed", other),
        }
    }
}
