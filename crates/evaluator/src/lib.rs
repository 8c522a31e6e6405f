//! Scoring of model answers on the vulnerability benchmark
//!
//! Metrics come from a closed registry ([`SingleMetric`], [`AggregateMetric`])
//! and are grouped per task into a [`MetricFamily`]. An [`Evaluator`] turns
//! the answers of one task pass into a [`TaskReport`].

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod evaluator;
pub mod metrics;
mod report;

pub use evaluator::Evaluator;
pub use metrics::{AggregateMetric, Confusion, MetricFamily, SampleScore, ScoreKind, SingleMetric};
pub use report::{MetricResult, OverallMetric, SimplifiedReport, TaskReport, VerboseEntry};
