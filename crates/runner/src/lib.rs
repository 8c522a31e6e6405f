//! Benchmark run loop
//!
//! Feeds every task's prompts to a chat model one at a time, scores the
//! answers and persists the resulting report.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod report;
mod runner;
mod tally;

pub use report::ReportWriter;
pub use runner::{BenchmarkRunner, RunOutcome, TaskAnswers};
pub use tally::FailureTally;
