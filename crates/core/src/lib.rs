//! Core types for the vulnrag benchmark
//!
//! This crate provides the foundational pieces used throughout the
//! vulnrag workspace:
//!
//! - **Records**: benchmark samples, prompt envelopes and answer records
//! - **Configuration**: layered TOML + environment configuration
//! - **Error handling**: unified error types
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod records;

// Re-export main types for convenience
pub use config::{
    BenchmarkConfig, Config, EmbeddingsConfig, ModelConfig, ReportConfig, RetrievalConfig,
};
pub use error::{Error, Result, ResultExt};
pub use records::{AnswerRecord, BenchmarkSample, PromptEnvelope, PromptMethod, TaskKind};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::records::{AnswerRecord, BenchmarkSample, PromptEnvelope, TaskKind};
}
