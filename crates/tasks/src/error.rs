use std::path::PathBuf;
use thiserror::Error;
use vulnrag_core::Error as CoreError;

/// Benchmark loading and validation errors
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Cannot read benchmark file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: duplicate sample id '{id}'", .path.display())]
    DuplicateId { path: PathBuf, id: String },

    #[error("Sample '{id}': invalid gold answer '{gold}': {reason}")]
    InvalidGold {
        id: String,
        gold: String,
        reason: String,
    },

    #[error("Sample '{id}': invalid selection: {reason}")]
    InvalidSelection { id: String, reason: String },
}

impl From<BenchmarkError> for CoreError {
    fn from(err: BenchmarkError) -> Self {
        CoreError::benchmark(err.to_string())
    }
}
