//! vulnrag CLI - retrieval-augmented vulnerability benchmark
//!
//! This binary provides the command-line interface for running the benchmark,
//! probing the retrieval engine and building its index.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vulnrag::{build_index, query_exemplars, run_benchmark, QuerySource, RunOverrides};
use vulnrag_core::{Config, PromptMethod, TaskKind};

#[derive(Parser)]
#[command(name = "vulnrag")]
#[command(about = "Retrieval-augmented vulnerability detection benchmark")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark against the configured chat model
    Run {
        /// Prompting method: zero-shot or few-shot
        #[arg(long)]
        method: Option<PromptMethod>,
        /// Task to run (existence, type-infer, or 1/2); repeat for several
        #[arg(long = "task", value_name = "TASK")]
        tasks: Vec<TaskKind>,
        /// Maximum exemplar distance for few-shot prompting
        #[arg(long)]
        threshold: Option<f32>,
        /// Directory for the evaluation report (stdout when unset)
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,
        /// Report file name
        #[arg(long)]
        result_name: Option<String>,
    },
    /// Find historical vulnerabilities similar to a piece of code
    Query {
        /// File containing the code to look up
        #[arg(long, value_name = "FILE", conflicts_with = "corpus_entry")]
        code_file: Option<PathBuf>,
        /// Use the code of this corpus entry
        #[arg(long, value_name = "N")]
        corpus_entry: Option<usize>,
        /// Number of hits
        #[arg(long)]
        top_k: Option<usize>,
        /// Audit record name
        #[arg(long)]
        name: Option<String>,
    },
    /// Embed the exemplar corpus and write the nearest-neighbor index
    BuildIndex {
        /// Index output path (defaults to retrieval.index_path)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            method,
            tasks,
            threshold,
            save_dir,
            result_name,
        } => {
            let overrides = RunOverrides {
                method,
                tasks,
                threshold,
                save_dir,
                result_name,
            };
            run(config, overrides).await
        }
        Commands::Query {
            code_file,
            corpus_entry,
            top_k,
            name,
        } => {
            let source = match (code_file, corpus_entry) {
                (Some(path), _) => QuerySource::CodeFile(path),
                (None, Some(position)) => QuerySource::CorpusEntry(position),
                (None, None) => anyhow::bail!("query needs --code-file or --corpus-entry"),
            };
            query(&config, source, top_k, name.as_deref()).await
        }
        Commands::BuildIndex { output } => {
            let path = build_index(&config, output.as_deref()).await?;
            println!("Index written to {}", path.display());
            Ok(())
        }
    }
}

const WORKSPACE_CRATES: &[&str] = &[
    "vulnrag",
    "vulnrag_core",
    "vulnrag_embeddings",
    "vulnrag_retrieval",
    "vulnrag_evaluator",
    "vulnrag_tasks",
    "vulnrag_models",
    "vulnrag_runner",
];

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let filter = WORKSPACE_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn run(mut config: Config, overrides: RunOverrides) -> Result<()> {
    overrides.apply(&mut config);
    let model = vulnrag_models::create_chat_model(&config.model)?;

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling run");
            ctrl_c_token.cancel();
        }
    });

    let outcome = run_benchmark(&config, model, token, true).await?;

    // stdout may carry the report itself, so the tally goes to the log
    info!("Failed model calls: {}", outcome.failures.total());
    for (task_name, failures) in outcome.failures.per_task() {
        info!("  {task_name}: {failures} failed model call(s)");
    }
    Ok(())
}

async fn query(
    config: &Config,
    source: QuerySource,
    top_k: Option<usize>,
    name: Option<&str>,
) -> Result<()> {
    let hits = query_exemplars(config, source, top_k, name).await?;
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}
