//! End-to-end command tests with mock embeddings and a scripted model

use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vulnrag::{build_index, query_exemplars, run_benchmark, QuerySource, RunOverrides};
use vulnrag_core::{Config, PromptMethod, TaskKind};
use vulnrag_models::ScriptedChatModel;

const CORPUS: &[&str] = &[
    r#"{"cve_id":"CVE-2019-0001","cwe_id":"CWE-787","description":"strcpy into fixed buffer","code_before":"char b[4]; strcpy(b, s);"}"#,
    r#"{"cve_id":"CVE-2019-0002","cwe_id":"CWE-416","description":"use after free","code_before":"free(p); p->n = 1;"}"#,
];

fn workspace(dir: &Path) -> Config {
    std::fs::write(dir.join("corpus.jsonl"), CORPUS.join("\n")).unwrap();

    let data_dir = dir.join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(
        data_dir.join("task1_code.jsonl"),
        [
            r#"{"code":"char b[4]; strcpy(b, s);","answer":"YES","cwe":"787","idx":0}"#,
            r#"{"code":"return x * 2;","answer":"NO","cwe":"787","idx":1}"#,
        ]
        .join("\n"),
    )
    .unwrap();

    let mut config = Config::from_toml_str(
        r#"
        [embeddings]
        provider = "mock"
        embedding_dimension = 64
        "#,
    )
    .unwrap();
    config.retrieval.corpus_path = Some(dir.join("corpus.jsonl"));
    config.retrieval.index_path = Some(dir.join("index").join("index.json"));
    config.benchmark.data_dir = data_dir;
    config
}

#[tokio::test]
async fn test_build_index_then_query_corpus_entry() {
    let dir = TempDir::new().unwrap();
    let mut config = workspace(dir.path());
    config.retrieval.audit_dir = Some(dir.path().join("audit"));

    let index_path = build_index(&config, None).await.unwrap();
    assert!(index_path.exists());

    let hits = query_exemplars(&config, QuerySource::CorpusEntry(1), Some(2), Some("lookup.json"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].vuln_id, "CVE-2019-0002");
    assert_eq!(hits[0].distance, 0.0);
    assert!(dir.path().join("audit").join("lookup.json").exists());

    let out_of_range =
        query_exemplars(&config, QuerySource::CorpusEntry(9), None, None).await;
    assert!(out_of_range.is_err());
}

#[tokio::test]
async fn test_few_shot_run_writes_report() {
    let dir = TempDir::new().unwrap();
    let mut config = workspace(dir.path());
    build_index(&config, None).await.unwrap();

    RunOverrides {
        method: Some(PromptMethod::FewShot),
        tasks: vec![TaskKind::Existence],
        threshold: Some(0.0),
        save_dir: Some(dir.path().join("out")),
        result_name: Some("report.json".to_string()),
    }
    .apply(&mut config);

    let model = Arc::new(ScriptedChatModel::new(["YES", "NO"]));
    let outcome = run_benchmark(&config, model.clone(), CancellationToken::new(), false)
        .await
        .unwrap();

    assert_eq!(outcome.reports[0].overall("Accuracy"), Some(1.0));
    assert_eq!(outcome.failures.total(), 0);

    let prompts = model.prompts().await;
    assert_eq!(
        prompts[0].example_text,
        "char b[4]; strcpy(b, s);\nstrcpy into fixed buffer"
    );
    assert_eq!(prompts[1].example_text, "");

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out").join("report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report[0]["overall metrics"][1]["F1-Score"], 1.0);
}

#[tokio::test]
async fn test_few_shot_without_index_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = workspace(dir.path());
    config.benchmark.method = PromptMethod::FewShot;
    config.retrieval.index_path = None;

    let result = run_benchmark(
        &config,
        Arc::new(ScriptedChatModel::new(Vec::<String>::new())),
        CancellationToken::new(),
        false,
    )
    .await;
    assert!(result.is_err());
}
