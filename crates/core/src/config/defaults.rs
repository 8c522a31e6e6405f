//! Default values and functions for configuration

use crate::records::TaskKind;
use std::path::PathBuf;

// Default constants
pub(crate) const DEFAULT_EMBEDDING_PROVIDER: &str = "localapi";
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = "McGill-NLP/LLM2Vec-Meta-Llama-3-8B-Instruct-mntp";
pub(crate) const DEFAULT_EMBEDDING_API_BASE_URL: &str = "http://localhost:8000/v1";
pub(crate) const DEFAULT_AUDIT_NAME: &str = "history_vulns.json";
pub(crate) const DEFAULT_DATA_DIR: &str = "data";
pub(crate) const DEFAULT_MODEL_API_BASE_URL: &str = "https://api.deepseek.com";
pub(crate) const DEFAULT_MODEL: &str = "deepseek-chat";
pub(crate) const DEFAULT_RESULT_NAME: &str = "evaluation_report.json";

pub(crate) fn default_embedding_provider() -> String {
    DEFAULT_EMBEDDING_PROVIDER.to_string()
}

pub(crate) fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

pub(crate) fn default_embedding_api_base_url() -> Option<String> {
    Some(DEFAULT_EMBEDDING_API_BASE_URL.to_string())
}

pub(crate) fn default_embedding_dimension() -> usize {
    4096
}

pub(crate) fn default_texts_per_api_request() -> usize {
    32
}

pub(crate) fn default_max_concurrent_api_requests() -> usize {
    4
}

pub(crate) fn default_embedding_retry_attempts() -> usize {
    5
}

pub(crate) fn default_threshold() -> f32 {
    0.5
}

pub(crate) fn default_top_k() -> usize {
    5
}

pub(crate) fn default_audit_name() -> String {
    DEFAULT_AUDIT_NAME.to_string()
}

pub(crate) fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

pub(crate) fn default_tasks() -> Vec<TaskKind> {
    TaskKind::ALL.to_vec()
}

pub(crate) fn default_model_api_base_url() -> String {
    DEFAULT_MODEL_API_BASE_URL.to_string()
}

pub(crate) fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

pub(crate) fn default_temperature() -> f32 {
    0.1
}

pub(crate) fn default_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_failure_cooldown_secs() -> u64 {
    10
}

pub(crate) fn default_debug_sample_interval() -> usize {
    300
}

pub(crate) fn default_result_name() -> String {
    DEFAULT_RESULT_NAME.to_string()
}

pub(crate) fn default_true() -> bool {
    true
}
