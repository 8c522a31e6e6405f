use vulnrag_core::config::{Config, ReportConfig, RetrievalConfig};
use vulnrag_core::{PromptMethod, TaskKind};

#[test]
fn test_retrieval_config_defaults() {
    let config = RetrievalConfig::default();
    assert_eq!(config.threshold, 0.5);
    assert_eq!(config.top_k, 5);
    assert_eq!(config.audit_name, "history_vulns.json");
    assert!(config.index_path.is_none());
    assert!(config.corpus_path.is_none());
    assert!(config.audit_dir.is_none());
}

#[test]
fn test_report_config_defaults() {
    let config = ReportConfig::default();
    assert!(config.save_dir.is_none());
    assert_eq!(config.result_name, "evaluation_report.json");
    assert!(config.verbose);
}

#[test]
fn test_default_config_is_valid_zero_shot_run_over_both_tasks() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.benchmark.method, PromptMethod::ZeroShot);
    assert_eq!(config.benchmark.tasks, TaskKind::ALL.to_vec());
}

#[test]
fn test_config_validation_embedding_dimension() {
    let mut config = Config::default();

    config.embeddings.embedding_dimension = 4096;
    assert!(config.validate().is_ok());

    config.embeddings.embedding_dimension = 0;
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("embedding_dimension"));
}

#[test]
fn test_config_validation_top_k() {
    let mut config = Config::default();
    config.retrieval.top_k = 0;
    assert!(config.validate().is_err());
}
