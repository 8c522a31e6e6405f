use thiserror::Error;
use vulnrag_core::Error as CoreError;

/// Result type for retrieval operations
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Retrieval-specific error types
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Failed to load index: {0}")]
    IndexLoad(String),

    #[error("Failed to save index: {0}")]
    IndexSave(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Exemplar corpus is empty")]
    EmptyCorpus,

    #[error("Corpus has {corpus} records but index has {index} items")]
    CorpusIndexMismatch { corpus: usize, index: usize },

    #[error("Failed to load corpus: {0}")]
    CorpusLoad(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to write audit record: {0}")]
    AuditWrite(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),
}

impl From<RetrievalError> for CoreError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::InvalidArgument(msg) => CoreError::invalid_input(msg),
            RetrievalError::Embedding(msg) => CoreError::embedding(msg),
            other => CoreError::retrieval(other.to_string()),
        }
    }
}
