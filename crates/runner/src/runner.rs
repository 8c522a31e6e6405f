//! Sequential benchmark driver

use crate::tally::FailureTally;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vulnrag_core::error::{Error, Result};
use vulnrag_core::AnswerRecord;
use vulnrag_evaluator::{Evaluator, TaskReport};
use vulnrag_models::ChatModel;
use vulnrag_tasks::{TaskItem, Tasks};

/// Reports of a completed run and the calls that failed along the way
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reports: Vec<TaskReport>,
    pub failures: FailureTally,
}

/// Answers of one task pass
#[derive(Debug, Clone)]
pub struct TaskAnswers {
    pub task_name: String,
    pub answers: Vec<AnswerRecord>,
    pub failures: usize,
}

/// Drives every task through the model, one call in flight at a time
pub struct BenchmarkRunner {
    model: Arc<dyn ChatModel>,
    call_timeout: Duration,
    cancellation_token: CancellationToken,
    show_progress: bool,
}

impl BenchmarkRunner {
    pub fn new(model: Arc<dyn ChatModel>, call_timeout: Duration) -> Self {
        Self {
            model,
            call_timeout,
            cancellation_token: CancellationToken::new(),
            show_progress: true,
        }
    }

    /// Abort the run when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run every task, then score each one
    pub async fn run(&self, tasks: Tasks) -> Result<RunOutcome> {
        let mut passes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let evaluator = Evaluator::new(task.name(), task.metric_family().clone());
            let answers = self.run_task(task).await?;
            passes.push((evaluator, answers));
        }

        let mut failures = FailureTally::default();
        let reports = passes
            .into_iter()
            .map(|(evaluator, pass)| {
                failures.record(&pass.task_name, pass.failures);
                evaluator.eval(&pass.answers)
            })
            .collect();

        info!(
            "Benchmark run finished with {} failed model calls",
            failures.total()
        );
        Ok(RunOutcome { reports, failures })
    }

    /// Ask the model every question of one task, in order
    pub async fn run_task(&self, task: TaskItem) -> Result<TaskAnswers> {
        let task_name = task.name().to_string();
        info!("Running task: {task_name}");

        let progress = self.progress_bar(task.len());
        progress.set_message(task_name.clone());

        let mut answers = Vec::with_capacity(task.len());
        let mut failures = 0;

        for entry in task {
            if self.cancellation_token.is_cancelled() {
                progress.abandon();
                return Err(Error::cancelled(format!("stopped during '{task_name}'")));
            }

            let output = tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    progress.abandon();
                    return Err(Error::cancelled(format!(
                        "stopped during '{task_name}' at sample {}",
                        entry.id
                    )));
                }
                result = tokio::time::timeout(self.call_timeout, self.model.invoke(&entry.prompt)) => {
                    match result {
                        Ok(output) => output,
                        Err(_) => {
                            warn!(
                                "Model call for sample {} timed out after {:?}",
                                entry.id, self.call_timeout
                            );
                            String::new()
                        }
                    }
                }
            };

            if output.is_empty() {
                failures += 1;
            }
            debug!("Sample {}: {} chars answered", entry.id, output.len());

            answers.push(AnswerRecord {
                id: entry.id,
                prompt: entry.prompt,
                model_output: output,
                gold_answer: entry.gold_answer,
            });
            progress.inc(1);
        }

        progress.finish_with_message(format!("{task_name} done"));
        if failures > 0 {
            warn!("{failures}/{} model calls failed in '{task_name}'", answers.len());
        }

        Ok(TaskAnswers {
            task_name,
            answers,
            failures,
        })
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .map_err(|e| error!("Failed to set progress bar style: {}", e))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        pb
    }
}
