use crate::benchmark::load_benchmark;
use crate::templates::TaskTemplate;
use std::path::PathBuf;
use tracing::info;
use vulnrag_core::error::{Error, Result};
use vulnrag_core::{BenchmarkConfig, PromptEnvelope, PromptMethod, TaskKind};
use vulnrag_evaluator::MetricFamily;
use vulnrag_retrieval::RetrievalEngine;

/// One rendered question of a task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEntry {
    pub id: String,
    pub prompt: PromptEnvelope,
    pub gold_answer: String,
}

/// The rendered questions of one task, consumed in a single forward pass
///
/// Once exhausted it stays exhausted; build the tasks again for another pass.
#[derive(Debug)]
pub struct TaskItem {
    kind: TaskKind,
    name: String,
    family: MetricFamily,
    entries: std::vec::IntoIter<TaskEntry>,
}

impl TaskItem {
    pub fn new(kind: TaskKind, entries: Vec<TaskEntry>) -> Result<Self> {
        let template = TaskTemplate::for_kind(kind);
        Ok(Self {
            kind,
            name: template.name.to_string(),
            family: template.metric_family()?,
            entries: entries.into_iter(),
        })
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric_family(&self) -> &MetricFamily {
        &self.family
    }
}

impl Iterator for TaskItem {
    type Item = TaskEntry;

    fn next(&mut self) -> Option<TaskEntry> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for TaskItem {}

/// What to build
#[derive(Debug, Clone)]
pub struct TaskOptions {
    pub data_dir: PathBuf,
    pub method: PromptMethod,
    pub tasks: Vec<TaskKind>,
    /// Maximum exemplar distance for few-shot prompting
    pub threshold: f32,
}

impl TaskOptions {
    pub fn from_config(benchmark: &BenchmarkConfig, threshold: f32) -> Self {
        Self {
            data_dir: benchmark.data_dir.clone(),
            method: benchmark.method,
            tasks: benchmark.tasks.clone(),
            threshold,
        }
    }
}

/// The ordered tasks of a run
#[derive(Debug)]
pub struct Tasks {
    items: Vec<TaskItem>,
}

impl Tasks {
    /// Load, augment and render every configured task
    ///
    /// Few-shot prompting requires a retrieval engine.
    pub async fn build(options: &TaskOptions, retrieval: Option<&RetrievalEngine>) -> Result<Self> {
        if options.tasks.is_empty() {
            return Err(Error::config("at least one task must be selected"));
        }
        let engine = match (options.method, retrieval) {
            (PromptMethod::FewShot, None) => {
                return Err(Error::config(
                    "few-shot prompting requires a retrieval engine",
                ))
            }
            (PromptMethod::FewShot, Some(engine)) => Some(engine),
            (PromptMethod::ZeroShot, _) => None,
        };

        let mut items = Vec::with_capacity(options.tasks.len());
        for &kind in &options.tasks {
            let template = TaskTemplate::for_kind(kind);
            let path = options.data_dir.join(kind.benchmark_file_name());
            let samples = load_benchmark(&path, kind)?;

            let examples = match engine {
                Some(engine) => engine.augment_all(&samples, options.threshold).await?,
                None => vec![String::new(); samples.len()],
            };

            let entries = samples
                .iter()
                .zip(&examples)
                .map(|(sample, example)| TaskEntry {
                    id: sample.id.clone(),
                    prompt: template.render(sample, options.method, example),
                    gold_answer: sample.gold_answer.clone(),
                })
                .collect();

            info!(
                "Prepared task '{}' ({} samples, {})",
                template.name,
                samples.len(),
                options.method
            );
            items.push(TaskItem::new(kind, entries)?);
        }

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Tasks {
    type Item = TaskItem;
    type IntoIter = std::vec::IntoIter<TaskItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
