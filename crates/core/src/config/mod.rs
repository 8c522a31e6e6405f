//! Configuration module for the vulnrag system
//!
//! This module provides configuration structures and loading mechanisms for a
//! benchmark run. Configuration can be loaded from TOML files and/or environment
//! variables.

mod defaults;
mod loading;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use crate::records::{PromptMethod, TaskKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.vulnrag/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".vulnrag").join("config.toml"))
}

/// Main configuration structure for a benchmark run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Embeddings configuration
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Retrieval engine configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Benchmark and task selection
    #[serde(default)]
    pub benchmark: BenchmarkConfig,

    /// Chat model under evaluation
    #[serde(default)]
    pub model: ModelConfig,

    /// Report output
    #[serde(default)]
    pub report: ReportConfig,
}

/// Configuration for embeddings generation
///
/// # Providers
/// - `localapi` (default): vLLM or any OpenAI-compatible embeddings endpoint
/// - `mock`: deterministic hashed embeddings for testing
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Provider type: "localapi" (default), "mock"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model name to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API base URL for the localapi provider
    #[serde(default = "default_embedding_api_base_url")]
    pub api_base_url: Option<String>,

    /// API key for authentication (or use the EMBEDDING_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Embedding dimension size; must match the nearest-neighbor index
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Number of texts sent in a single embedding API request
    #[serde(default = "default_texts_per_api_request")]
    pub texts_per_api_request: usize,

    /// Maximum concurrent embedding API requests
    #[serde(default = "default_max_concurrent_api_requests")]
    pub max_concurrent_api_requests: usize,

    /// Number of retry attempts for failed embedding requests
    #[serde(default = "default_embedding_retry_attempts")]
    pub retry_attempts: usize,
}

impl std::fmt::Debug for EmbeddingsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingsConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("embedding_dimension", &self.embedding_dimension)
            .field("texts_per_api_request", &self.texts_per_api_request)
            .field(
                "max_concurrent_api_requests",
                &self.max_concurrent_api_requests,
            )
            .field("retry_attempts", &self.retry_attempts)
            .finish()
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            api_base_url: default_embedding_api_base_url(),
            api_key: None,
            embedding_dimension: default_embedding_dimension(),
            texts_per_api_request: default_texts_per_api_request(),
            max_concurrent_api_requests: default_max_concurrent_api_requests(),
            retry_attempts: default_embedding_retry_attempts(),
        }
    }
}

/// Configuration for the retrieval engine used by few-shot prompting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Persisted angular index, aligned with the corpus
    #[serde(default)]
    pub index_path: Option<PathBuf>,

    /// Exemplar corpus (JSONL)
    #[serde(default)]
    pub corpus_path: Option<PathBuf>,

    /// Maximum angular distance at which an exemplar is attached
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Number of hits returned by ad-hoc queries
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Directory for query audit records; auditing is off when unset
    #[serde(default)]
    pub audit_dir: Option<PathBuf>,

    /// File name of the audit record written by ad-hoc queries
    #[serde(default = "default_audit_name")]
    pub audit_name: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            corpus_path: None,
            threshold: default_threshold(),
            top_k: default_top_k(),
            audit_dir: None,
            audit_name: default_audit_name(),
        }
    }
}

/// Benchmark location and task selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Directory holding `task1_code.jsonl` / `task2_code.jsonl`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Prompting method
    #[serde(default)]
    pub method: PromptMethod,

    /// Tasks to run, in order
    #[serde(default = "default_tasks")]
    pub tasks: Vec<TaskKind>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            method: PromptMethod::default(),
            tasks: default_tasks(),
        }
    }
}

/// Configuration of the chat model under evaluation
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    #[serde(default = "default_model_api_base_url")]
    pub api_base_url: String,

    /// Model name sent with each request
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (or use the OPENAI_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on a single model call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause after a failed call before the next one
    #[serde(default = "default_failure_cooldown_secs")]
    pub failure_cooldown_secs: u64,

    /// Log every Nth request payload at debug level (0 disables)
    #[serde(default = "default_debug_sample_interval")]
    pub debug_sample_interval: usize,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("failure_cooldown_secs", &self.failure_cooldown_secs)
            .field("debug_sample_interval", &self.debug_sample_interval)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_model_api_base_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            failure_cooldown_secs: default_failure_cooldown_secs(),
            debug_sample_interval: default_debug_sample_interval(),
        }
    }
}

/// Where and how the evaluation report is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Destination directory; the report goes to stdout when unset
    #[serde(default)]
    pub save_dir: Option<PathBuf>,

    /// Report file name inside `save_dir`
    #[serde(default = "default_result_name")]
    pub result_name: String,

    /// Keep per-sample entries; `false` writes only overall metrics per task
    #[serde(default = "default_true")]
    pub verbose: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            save_dir: None,
            result_name: default_result_name(),
            verbose: true,
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["localapi", "api", "mock"];
        if !valid_providers.contains(&self.embeddings.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid provider '{}'. Must be one of: {:?}",
                self.embeddings.provider, valid_providers
            )));
        }

        if self.embeddings.embedding_dimension == 0 {
            return Err(Error::config(
                "embedding_dimension must be greater than 0".to_string(),
            ));
        }

        if self.embeddings.texts_per_api_request == 0 {
            return Err(Error::config(
                "embeddings.texts_per_api_request must be greater than 0".to_string(),
            ));
        }

        if self.embeddings.max_concurrent_api_requests == 0 {
            return Err(Error::config(
                "embeddings.max_concurrent_api_requests must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.retrieval.threshold) {
            return Err(Error::config(format!(
                "retrieval.threshold must be within [0, 2] (angular distance), got {}",
                self.retrieval.threshold
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(Error::config(
                "retrieval.top_k must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.audit_name.is_empty() {
            return Err(Error::config(
                "retrieval.audit_name cannot be empty".to_string(),
            ));
        }

        if self.benchmark.tasks.is_empty() {
            return Err(Error::config(
                "benchmark.tasks must name at least one task".to_string(),
            ));
        }

        if self.benchmark.method == PromptMethod::FewShot
            && (self.retrieval.index_path.is_none() || self.retrieval.corpus_path.is_none())
        {
            return Err(Error::config(
                "few-shot prompting requires retrieval.index_path and retrieval.corpus_path"
                    .to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(Error::config(format!(
                "model.temperature must be within [0, 2], got {}",
                self.model.temperature
            )));
        }

        if self.model.timeout_secs == 0 {
            return Err(Error::config(
                "model.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.report.result_name.is_empty() {
            return Err(Error::config(
                "report.result_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
