use crate::metrics::{MetricFamily, SampleScore};
use crate::report::{MetricResult, OverallMetric, TaskReport, VerboseEntry};
use std::collections::HashSet;
use tracing::debug;
use vulnrag_core::AnswerRecord;

/// Scores the answers of one task with its metric family
#[derive(Debug, Clone)]
pub struct Evaluator {
    task_name: String,
    family: MetricFamily,
}

impl Evaluator {
    pub fn new(task_name: impl Into<String>, family: MetricFamily) -> Self {
        Self {
            task_name: task_name.into(),
            family,
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Score every answer and aggregate per metric position
    ///
    /// A sample lists each metric name once; a later metric with a name
    /// already listed still feeds its own aggregate.
    pub fn eval(&self, answers: &[AnswerRecord]) -> TaskReport {
        let mut per_metric: Vec<Vec<SampleScore>> =
            vec![Vec::with_capacity(answers.len()); self.family.len()];
        let mut verbose = Vec::with_capacity(answers.len());

        for answer in answers {
            let mut seen = HashSet::new();
            let mut metrics = Vec::new();

            for (position, single) in self.family.singles().iter().enumerate() {
                let scored = single.score(&answer.model_output, &answer.gold_answer);
                per_metric[position].push(scored.score);

                if seen.insert(single.name()) {
                    metrics.push(MetricResult {
                        metric_name: single.name().to_string(),
                        extracted_answer: scored.extracted_answer,
                        score: scored.score.value(),
                        prompt: answer.prompt.clone(),
                        raw_output: answer.model_output.clone(),
                    });
                }
            }

            verbose.push(VerboseEntry {
                id: answer.id.clone(),
                gold: answer.gold_answer.clone(),
                metrics,
            });
        }

        let overall_metrics = self
            .family
            .aggregates()
            .iter()
            .zip(&per_metric)
            .map(|(aggregate, scores)| OverallMetric {
                name: aggregate.name().to_string(),
                value: aggregate.aggregate(scores),
            })
            .collect::<Vec<_>>();

        debug!(
            "Evaluated {} answers for '{}': {:?}",
            answers.len(),
            self.task_name,
            overall_metrics
        );

        TaskReport {
            task_name: self.task_name.clone(),
            overall_metrics,
            verbose,
        }
    }
}
