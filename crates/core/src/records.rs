//! Records shared across the benchmark pipeline
//!
//! Samples flow from the task orchestrator through the model capability and
//! into the evaluator; every stage speaks in terms of these types.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of benchmark tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Binary question: is the code vulnerable?
    Existence,
    /// Five-way single choice over CWE classes
    TypeInfer,
}

impl TaskKind {
    /// All tasks in benchmark order
    pub const ALL: [TaskKind; 2] = [TaskKind::Existence, TaskKind::TypeInfer];

    /// One-based task number used in benchmark file names
    pub fn number(self) -> u8 {
        match self {
            Self::Existence => 1,
            Self::TypeInfer => 2,
        }
    }

    /// Resolve a task from its one-based number
    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            1 => Ok(Self::Existence),
            2 => Ok(Self::TypeInfer),
            other => Err(Error::invalid_input(format!(
                "task number must be 1 or 2, got {other}"
            ))),
        }
    }

    /// File name of the benchmark for this task inside a data directory
    pub fn benchmark_file_name(self) -> String {
        format!("task{}_code.jsonl", self.number())
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existence => write!(f, "existence"),
            Self::TypeInfer => write!(f, "type-infer"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "existence" | "1" => Ok(Self::Existence),
            "type-infer" | "typeinfer" | "type_infer" | "2" => Ok(Self::TypeInfer),
            other => Err(Error::invalid_input(format!(
                "Unknown task '{other}'. Valid tasks: existence, type-infer"
            ))),
        }
    }
}

/// How prompts are built for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptMethod {
    /// Question and code only
    #[default]
    ZeroShot,
    /// Question, a retrieved exemplar, then the code
    FewShot,
}

impl fmt::Display for PromptMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroShot => write!(f, "zero-shot"),
            Self::FewShot => write!(f, "few-shot"),
        }
    }
}

impl FromStr for PromptMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zero-shot" | "zero_shot" | "zeroshot" => Ok(Self::ZeroShot),
            "few-shot" | "few_shot" | "fewshot" => Ok(Self::FewShot),
            other => Err(Error::invalid_input(format!(
                "Unknown method '{other}'. Valid methods: zero-shot, few-shot"
            ))),
        }
    }
}

/// One benchmark question as loaded from a task file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSample {
    /// Identifier, unique within its benchmark file
    pub id: String,
    /// Source code under test
    pub code: String,
    /// `YES`/`NO` for existence, a `<Letter>.<label>` line (optionally
    /// `primary|secondary`) for type inference
    pub gold_answer: String,
    /// The five `<Letter>.<label>` candidates of a type-inference question
    pub selection_set: Option<Vec<String>>,
    /// Raw selection block as it appears in the file, rendered verbatim
    pub selection_text: Option<String>,
    /// CWE number of the sample, when the file records one
    pub cwe: Option<String>,
}

/// The three text parts sent to the model for one sample
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptEnvelope {
    #[serde(rename = "system")]
    pub system_text: String,
    #[serde(rename = "user")]
    pub user_text: String,
    #[serde(rename = "example")]
    pub example_text: String,
}

/// The model's answer to one sample, paired with its gold label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: String,
    pub prompt: PromptEnvelope,
    /// Raw model output; empty when the call failed
    pub model_output: String,
    pub gold_answer: String,
}

impl AnswerRecord {
    /// Whether the model call behind this record failed
    pub fn is_failed(&self) -> bool {
        self.model_output.is_empty()
    }
}
