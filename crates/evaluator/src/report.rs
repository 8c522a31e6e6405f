//! Evaluation report types and their JSON shape

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use vulnrag_core::PromptEnvelope;

/// One single metric's verdict on one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    #[serde(rename = "single metric")]
    pub metric_name: String,
    #[serde(rename = "extracted answer")]
    pub extracted_answer: String,
    pub score: f64,
    pub prompt: PromptEnvelope,
    #[serde(rename = "original answer")]
    pub raw_output: String,
}

/// All metric results of one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerboseEntry {
    pub id: String,
    pub gold: String,
    pub metrics: Vec<MetricResult>,
}

/// A named task-level score, serialized as `{name: value}`
#[derive(Debug, Clone, PartialEq)]
pub struct OverallMetric {
    pub name: String,
    pub value: f64,
}

impl Serialize for OverallMetric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.value)?;
        map.end()
    }
}

/// Scores of one task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    #[serde(rename = "task name")]
    pub task_name: String,
    #[serde(rename = "overall metrics")]
    pub overall_metrics: Vec<OverallMetric>,
    pub verbose: Vec<VerboseEntry>,
}

impl TaskReport {
    /// Value of an overall metric by name
    pub fn overall(&self, name: &str) -> Option<f64> {
        self.overall_metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }
}

/// Task name -> overall metrics, in task order
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifiedReport(Vec<(String, Vec<OverallMetric>)>);

impl SimplifiedReport {
    pub fn from_reports(reports: &[TaskReport]) -> Self {
        Self(
            reports
                .iter()
                .map(|r| (r.task_name.clone(), r.overall_metrics.clone()))
                .collect(),
        )
    }
}

impl Serialize for SimplifiedReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (task_name, metrics) in &self.0 {
            map.serialize_entry(task_name, metrics)?;
        }
        map.end()
    }
}
