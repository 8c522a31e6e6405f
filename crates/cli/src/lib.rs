//! Library interface for the vulnrag CLI
//!
//! The command handlers live here so integration tests can drive them with
//! test doubles; main.rs only parses arguments and wires up signals.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use vulnrag_core::config::RetrievalConfig;
use vulnrag_core::{Config, PromptMethod, TaskKind};
use vulnrag_embeddings::EmbeddingManager;
use vulnrag_models::ChatModel;
use vulnrag_retrieval::{
    build_index_from_corpus, AuditSettings, ExemplarCorpus, QueryRequest, RetrievalEngine,
    RetrievalHit,
};
use vulnrag_runner::{BenchmarkRunner, ReportWriter, RunOutcome};
use vulnrag_tasks::{TaskOptions, Tasks};

/// Command-line overrides for a benchmark run
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub method: Option<PromptMethod>,
    pub tasks: Vec<TaskKind>,
    pub threshold: Option<f32>,
    pub save_dir: Option<PathBuf>,
    pub result_name: Option<String>,
}

impl RunOverrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(method) = self.method {
            config.benchmark.method = method;
        }
        if !self.tasks.is_empty() {
            config.benchmark.tasks = self.tasks;
        }
        if let Some(threshold) = self.threshold {
            config.retrieval.threshold = threshold;
        }
        if let Some(save_dir) = self.save_dir {
            config.report.save_dir = Some(save_dir);
        }
        if let Some(result_name) = self.result_name {
            config.report.result_name = result_name;
        }
    }
}

/// Helper function to create an embedding manager from configuration
pub async fn create_embedding_manager(config: &Config) -> Result<Arc<EmbeddingManager>> {
    vulnrag_embeddings::create_embedding_manager_from_app_config(&config.embeddings)
        .await
        .map_err(Into::into)
}

pub fn audit_settings(config: &RetrievalConfig) -> AuditSettings {
    AuditSettings {
        dir: config.audit_dir.clone(),
        default_name: config.audit_name.clone(),
    }
}

fn required_path<'a>(path: &'a Option<PathBuf>, key: &str) -> Result<&'a Path> {
    path.as_deref()
        .ok_or_else(|| anyhow!("retrieval.{key} is not configured"))
}

/// Open the retrieval engine over the configured index and corpus
pub async fn open_retrieval_engine(config: &Config) -> Result<RetrievalEngine> {
    let index_path = required_path(&config.retrieval.index_path, "index_path")?;
    let corpus_path = required_path(&config.retrieval.corpus_path, "corpus_path")?;

    let manager = create_embedding_manager(config).await?;
    let engine = RetrievalEngine::open(
        manager.provider(),
        index_path,
        corpus_path,
        audit_settings(&config.retrieval),
    )
    .context("Failed to open retrieval engine")?;
    Ok(engine)
}

/// Build tasks, run them through `model` and persist the report
pub async fn run_benchmark(
    config: &Config,
    model: Arc<dyn ChatModel>,
    cancellation_token: CancellationToken,
    show_progress: bool,
) -> Result<RunOutcome> {
    config.validate()?;

    let engine = match config.benchmark.method {
        PromptMethod::FewShot => Some(open_retrieval_engine(config).await?),
        PromptMethod::ZeroShot => None,
    };

    let options = TaskOptions::from_config(&config.benchmark, config.retrieval.threshold);
    let tasks = Tasks::build(&options, engine.as_ref()).await?;
    info!(
        "Running {} task(s) with model '{}' ({})",
        tasks.len(),
        model.name(),
        config.benchmark.method
    );

    let runner = BenchmarkRunner::new(
        model,
        std::time::Duration::from_secs(config.model.timeout_secs),
    )
    .with_cancellation(cancellation_token)
    .with_progress(show_progress);
    let outcome = runner.run(tasks).await?;

    ReportWriter::from_config(&config.report).persist(&outcome.reports)?;
    Ok(outcome)
}

/// What an ad-hoc retrieval query asks about
#[derive(Debug, Clone)]
pub enum QuerySource {
    CodeFile(PathBuf),
    CorpusEntry(usize),
}

/// Query the retrieval engine and write an audit record
///
/// Audit records go to `retrieval.audit_dir`, or the current directory when
/// none is configured.
pub async fn query_exemplars(
    config: &Config,
    source: QuerySource,
    top_k: Option<usize>,
    audit_name: Option<&str>,
) -> Result<Vec<RetrievalHit>> {
    let mut config = config.clone();
    if config.retrieval.audit_dir.is_none() {
        config.retrieval.audit_dir = Some(PathBuf::from("."));
    }
    let engine = open_retrieval_engine(&config).await?;

    let code = match source {
        QuerySource::CodeFile(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        QuerySource::CorpusEntry(position) => engine
            .corpus()
            .get(position)
            .map(|record| record.code_before.clone())
            .ok_or_else(|| {
                anyhow!(
                    "corpus entry {position} out of range (corpus has {} records)",
                    engine.corpus().len()
                )
            })?,
    };

    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let hits = engine
        .query(&QueryRequest::from_code(code), top_k, audit_name)
        .await?;
    Ok(hits)
}

/// Embed the configured corpus and save its index
///
/// Writes to `output`, falling back to `retrieval.index_path`.
pub async fn build_index(config: &Config, output: Option<&Path>) -> Result<PathBuf> {
    let corpus_path = required_path(&config.retrieval.corpus_path, "corpus_path")?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => required_path(&config.retrieval.index_path, "index_path")?.to_path_buf(),
    };

    let corpus = ExemplarCorpus::load(corpus_path)?;
    let manager = create_embedding_manager(config).await?;
    info!(
        "Embedding {} corpus records with {}",
        corpus.len(),
        manager.model_version()
    );

    let index = build_index_from_corpus(manager.provider().as_ref(), &corpus).await?;
    index.save(&output)?;
    Ok(output)
}
