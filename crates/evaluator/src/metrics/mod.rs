//! Metric registry
//!
//! Single metrics score one answer; aggregate metrics fold the per-sample
//! scores of the single metric at the same position into one number. Both
//! sets are closed and resolved from their display names.

mod existence;
mod type_infer;

use std::fmt;
use vulnrag_core::error::{Error, Result};

/// Outcome of one binary classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confusion {
    TruePositive,
    FalsePositive,
    TrueNegative,
    FalseNegative,
}

/// What kind of per-sample score a single metric produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    Confusion,
    Graded,
}

/// Per-sample score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleScore {
    Confusion(Confusion),
    Graded(f64),
}

impl SampleScore {
    pub fn kind(&self) -> ScoreKind {
        match self {
            Self::Confusion(_) => ScoreKind::Confusion,
            Self::Graded(_) => ScoreKind::Graded,
        }
    }

    /// Numeric value shown per sample; a correct classification counts 1
    pub fn value(&self) -> f64 {
        match self {
            Self::Confusion(Confusion::TruePositive | Confusion::TrueNegative) => 1.0,
            Self::Confusion(_) => 0.0,
            Self::Graded(v) => *v,
        }
    }
}

/// A single metric's verdict on one answer
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    /// The answer the metric read out of the model output
    pub extracted_answer: String,
    pub score: SampleScore,
}

/// Metrics that score one answer against its gold label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleMetric {
    Hit,
    ModerateEvaluationScore,
    StrictEvaluationScore,
}

impl SingleMetric {
    pub const ALL: [SingleMetric; 3] = [
        Self::Hit,
        Self::ModerateEvaluationScore,
        Self::StrictEvaluationScore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::ModerateEvaluationScore => "Moderate Evaluation Score",
            Self::StrictEvaluationScore => "Strict Evaluation Score",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| Error::metric(format!("Unknown single metric '{name}'")))
    }

    pub fn score_kind(self) -> ScoreKind {
        match self {
            Self::Hit => ScoreKind::Confusion,
            Self::ModerateEvaluationScore | Self::StrictEvaluationScore => ScoreKind::Graded,
        }
    }

    pub fn score(self, output: &str, gold: &str) -> Scored {
        match self {
            Self::Hit => existence::hit(output, gold),
            Self::ModerateEvaluationScore => type_infer::moderate(output, gold),
            Self::StrictEvaluationScore => type_infer::strict(output, gold),
        }
    }
}

impl fmt::Display for SingleMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metrics that fold per-sample scores into one task-level number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMetric {
    Accuracy,
    F1Score,
    AvgModerateEvaluationScore,
    AvgStrictEvaluationScore,
}

impl AggregateMetric {
    pub const ALL: [AggregateMetric; 4] = [
        Self::Accuracy,
        Self::F1Score,
        Self::AvgModerateEvaluationScore,
        Self::AvgStrictEvaluationScore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Accuracy => "Accuracy",
            Self::F1Score => "F1-Score",
            Self::AvgModerateEvaluationScore => "Avg Moderate Evaluation Score",
            Self::AvgStrictEvaluationScore => "Avg Strict Evaluation Score",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| Error::metric(format!("Unknown overall metric '{name}'")))
    }

    /// Score kind this aggregate folds
    pub fn accepts(self) -> ScoreKind {
        match self {
            Self::Accuracy | Self::F1Score => ScoreKind::Confusion,
            Self::AvgModerateEvaluationScore | Self::AvgStrictEvaluationScore => {
                ScoreKind::Graded
            }
        }
    }

    pub fn aggregate(self, scores: &[SampleScore]) -> f64 {
        match self {
            Self::Accuracy => existence::accuracy(scores),
            Self::F1Score => existence::f1(scores),
            Self::AvgModerateEvaluationScore | Self::AvgStrictEvaluationScore => {
                type_infer::mean(scores)
            }
        }
    }
}

impl fmt::Display for AggregateMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index-aligned single and aggregate metrics of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFamily {
    singles: Vec<SingleMetric>,
    aggregates: Vec<AggregateMetric>,
}

impl MetricFamily {
    /// Pair metrics position by position; lengths and score kinds must agree
    pub fn new(singles: Vec<SingleMetric>, aggregates: Vec<AggregateMetric>) -> Result<Self> {
        if singles.len() != aggregates.len() {
            return Err(Error::metric(format!(
                "number of single and overall metrics must match, got {} single and {} overall",
                singles.len(),
                aggregates.len()
            )));
        }
        if singles.is_empty() {
            return Err(Error::metric("a task needs at least one metric"));
        }
        for (single, aggregate) in singles.iter().zip(&aggregates) {
            if single.score_kind() != aggregate.accepts() {
                return Err(Error::metric(format!(
                    "overall metric '{aggregate}' cannot aggregate '{single}'"
                )));
            }
        }
        Ok(Self {
            singles,
            aggregates,
        })
    }

    /// Resolve both lists from display names
    pub fn from_names(singles: &[&str], aggregates: &[&str]) -> Result<Self> {
        let singles = singles
            .iter()
            .map(|n| SingleMetric::from_name(n))
            .collect::<Result<Vec<_>>>()?;
        let aggregates = aggregates
            .iter()
            .map(|n| AggregateMetric::from_name(n))
            .collect::<Result<Vec<_>>>()?;
        Self::new(singles, aggregates)
    }

    pub fn singles(&self) -> &[SingleMetric] {
        &self.singles
    }

    pub fn aggregates(&self) -> &[AggregateMetric] {
        &self.aggregates
    }

    pub fn len(&self) -> usize {
        self.singles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_resolve_both_ways() {
        for metric in SingleMetric::ALL {
            assert_eq!(SingleMetric::from_name(metric.name()).unwrap(), metric);
        }
        for metric in AggregateMetric::ALL {
            assert_eq!(AggregateMetric::from_name(metric.name()).unwrap(), metric);
        }
        assert!(SingleMetric::from_name("Token Recall").is_err());
        assert!(AggregateMetric::from_name("accuracy").is_err());
    }

    #[test]
    fn test_family_requires_equal_lengths() {
        let result = MetricFamily::from_names(&["hit", "hit"], &["Accuracy"]);
        assert!(matches!(result, Err(Error::Metric(_))));
    }

    #[test]
    fn test_family_requires_compatible_kinds() {
        let result = MetricFamily::from_names(&["hit"], &["Avg Strict Evaluation Score"]);
        assert!(matches!(result, Err(Error::Metric(_))));
    }

    #[test]
    fn test_family_from_task_metric_names() {
        let family = MetricFamily::from_names(
            &["Moderate Evaluation Score", "Strict Evaluation Score"],
            &["Avg Moderate Evaluation Score", "Avg Strict Evaluation Score"],
        )
        .unwrap();
        assert_eq!(family.len(), 2);
        assert_eq!(family.singles()[1], SingleMetric::StrictEvaluationScore);
    }
}
