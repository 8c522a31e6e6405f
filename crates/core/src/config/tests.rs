//! Tests for configuration module

use super::*;
use crate::error::{Error, Result};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn create_temp_config_file(content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .map_err(|e| Error::config(format!("Failed to create temp file: {e}")))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::config(format!("Failed to write temp file: {e}")))?;
    file.flush()
        .map_err(|e| Error::config(format!("Failed to flush temp file: {e}")))?;
    Ok(file)
}

fn with_env_var<F, T>(key: &str, value: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    std::env::set_var(key, value);
    let result = f();
    std::env::remove_var(key);
    result
}

#[test]
fn test_from_toml_str_valid() {
    let toml = r#"
        [embeddings]
        provider = "mock"
        embedding_dimension = 64

        [retrieval]
        index_path = "data/vulns.index.json"
        corpus_path = "data/all_fixes.jsonl"
        threshold = 0.1

        [benchmark]
        data_dir = "data/CWEClassesBench"
        method = "few-shot"
        tasks = ["type-infer"]

        [model]
        model = "gpt-4-turbo"
    "#;

    let config = Config::from_toml_str(toml).expect("Failed to parse valid TOML");
    assert_eq!(config.embeddings.provider, "mock");
    assert_eq!(config.embeddings.embedding_dimension, 64);
    assert_eq!(config.retrieval.threshold, 0.1);
    assert_eq!(config.benchmark.method, PromptMethod::FewShot);
    assert_eq!(config.benchmark.tasks, vec![TaskKind::TypeInfer]);
    assert_eq!(config.model.model, "gpt-4-turbo");
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml_str_empty_applies_defaults() {
    let config = Config::from_toml_str("").expect("Failed to parse empty TOML");
    assert_eq!(config.embeddings.provider, "localapi");
    assert_eq!(config.embeddings.embedding_dimension, 4096);
    assert_eq!(config.retrieval.threshold, 0.5);
    assert_eq!(config.retrieval.audit_name, "history_vulns.json");
    assert_eq!(config.benchmark.method, PromptMethod::ZeroShot);
    assert_eq!(
        config.benchmark.tasks,
        vec![TaskKind::Existence, TaskKind::TypeInfer]
    );
    assert_eq!(config.model.temperature, 0.1);
    assert_eq!(config.report.result_name, "evaluation_report.json");
    assert!(config.report.verbose);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml_str_invalid_syntax() {
    let toml = r#"
        [embeddings
        provider = "mock"
    "#;

    let result = Config::from_toml_str(toml);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Failed to parse TOML"));
}

#[test]
fn test_unknown_task_is_rejected() {
    let toml = r#"
        [benchmark]
        tasks = ["existence", "exploitability"]
    "#;
    assert!(Config::from_toml_str(toml).is_err());
}

#[test]
fn test_validate_rejects_invalid_provider() {
    let mut config = Config::default();
    config.embeddings.provider = "candle".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Invalid provider"));
}

#[test]
fn test_validate_rejects_threshold_outside_angular_range() {
    let mut config = Config::default();
    config.retrieval.threshold = 2.5;
    assert!(config.validate().is_err());

    config.retrieval.threshold = -0.1;
    assert!(config.validate().is_err());

    config.retrieval.threshold = 2.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_few_shot_requires_retrieval_paths() {
    let mut config = Config::default();
    config.benchmark.method = PromptMethod::FewShot;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("few-shot"));

    config.retrieval.index_path = Some("vulns.index.json".into());
    config.retrieval.corpus_path = Some("vulns.jsonl".into());
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_empty_task_list() {
    let mut config = Config::default();
    config.benchmark.tasks.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let mut config = Config::default();
    config.model.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_from_file_reads_toml() {
    let file = create_temp_config_file(
        r#"
        [report]
        save_dir = "results"
        result_name = "deepseek_task1_eval.json"
        verbose = false
        "#,
    )
    .expect("temp config");

    let config = Config::from_file(file.path()).expect("load config");
    assert_eq!(config.report.save_dir, Some("results".into()));
    assert_eq!(config.report.result_name, "deepseek_task1_eval.json");
    assert!(!config.report.verbose);
}

#[test]
fn test_from_file_missing_file_uses_defaults() {
    let config = Config::from_file(Path::new("/nonexistent/vulnrag/config.toml"))
        .expect("defaults when file is absent");
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.model.timeout_secs, 120);
}

#[test]
fn test_env_override_takes_precedence_over_file() {
    let file = create_temp_config_file(
        r#"
        [model]
        model = "deepseek-chat"
        "#,
    )
    .expect("temp config");

    let config = with_env_var("VULNRAG_MODEL__MODEL", "deepseek-reasoner", || {
        Config::from_file(file.path())
    })
    .expect("load config");
    assert_eq!(config.model.model, "deepseek-reasoner");
}

#[test]
fn test_debug_redacts_api_keys() {
    let mut config = Config::default();
    config.embeddings.api_key = Some("embed-secret".to_string());
    config.model.api_key = Some("chat-secret".to_string());

    let rendered = format!("{config:?}");
    assert!(!rendered.contains("embed-secret"));
    assert!(!rendered.contains("chat-secret"));
    assert!(rendered.contains("***REDACTED***"));
}
