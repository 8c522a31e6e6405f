//! Error types for the embeddings module

use std::fmt;

/// Errors that can occur during embedding operations
#[derive(Debug)]
pub enum EmbeddingError {
    /// Model loading or client setup failed
    ModelLoadError(String),

    /// Inference failed
    InferenceError(String),

    /// Returned vector has the wrong size
    DimensionMismatch { expected: usize, actual: usize },

    /// Unsupported provider
    UnsupportedProvider(String),

    /// Configuration error
    ConfigError(String),

    /// Other error
    Other(String),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Failed to load model: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference failed: {msg}"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            Self::UnsupportedProvider(provider) => {
                write!(f, "Unsupported embedding provider: {provider}")
            }
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "Embedding error: {msg}"),
        }
    }
}

impl std::error::Error for EmbeddingError {}

impl From<EmbeddingError> for vulnrag_core::error::Error {
    fn from(err: EmbeddingError) -> Self {
        vulnrag_core::error::Error::Embedding(err.to_string())
    }
}
