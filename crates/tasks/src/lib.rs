//! Benchmark tasks: loading samples and rendering them into model prompts

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod benchmark;
pub mod error;
mod task;
mod templates;

pub use benchmark::load_benchmark;
pub use error::BenchmarkError;
pub use task::{TaskEntry, TaskItem, TaskOptions, Tasks};
pub use templates::TaskTemplate;
