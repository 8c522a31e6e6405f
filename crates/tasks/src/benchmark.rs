//! Benchmark file loading
//!
//! A benchmark is JSONL, one sample per line:
//! - existence: `{code, answer: "YES"|"NO", cwe, idx}`
//! - type inference: `{selection, code, answer, cwe, idx}`, where `selection`
//!   holds five `<Letter>.<label>` lines and `answer` is one of them, optionally
//!   followed by `|<secondary>`.

use crate::error::BenchmarkError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use vulnrag_core::{BenchmarkSample, TaskKind};

const SELECTION_SIZE: usize = 5;

#[derive(Deserialize)]
struct RawSample {
    code: String,
    answer: String,
    #[serde(default)]
    selection: Option<String>,
    #[serde(default)]
    cwe: Value,
    idx: Value,
}

/// Render a JSON scalar as text; `None` for null and composite values
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_choice_line(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some('.')) if letter.is_ascii_uppercase()
    )
}

fn validate_existence(id: &str, gold: &str) -> Result<(), BenchmarkError> {
    match gold.trim() {
        "YES" | "NO" => Ok(()),
        _ => Err(BenchmarkError::InvalidGold {
            id: id.to_string(),
            gold: gold.to_string(),
            reason: "expected YES or NO".to_string(),
        }),
    }
}

fn parse_selection(id: &str, selection: Option<&str>) -> Result<Vec<String>, BenchmarkError> {
    let selection = selection.ok_or_else(|| BenchmarkError::InvalidSelection {
        id: id.to_string(),
        reason: "missing selection".to_string(),
    })?;

    let lines: Vec<String> = selection
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if lines.len() != SELECTION_SIZE {
        return Err(BenchmarkError::InvalidSelection {
            id: id.to_string(),
            reason: format!("expected {SELECTION_SIZE} choices, found {}", lines.len()),
        });
    }
    if let Some(bad) = lines.iter().find(|l| !is_choice_line(l)) {
        return Err(BenchmarkError::InvalidSelection {
            id: id.to_string(),
            reason: format!("'{bad}' is not a '<Letter>.<label>' line"),
        });
    }
    Ok(lines)
}

fn validate_type_infer(id: &str, gold: &str, choices: &[String]) -> Result<(), BenchmarkError> {
    let primary = gold.split('|').next().unwrap_or_default().trim();
    if choices.iter().any(|c| c == primary) {
        Ok(())
    } else {
        Err(BenchmarkError::InvalidGold {
            id: id.to_string(),
            gold: gold.to_string(),
            reason: "primary answer is not one of the choices".to_string(),
        })
    }
}

/// Load and validate one task's benchmark file, keeping file order
pub fn load_benchmark(path: &Path, kind: TaskKind) -> Result<Vec<BenchmarkSample>, BenchmarkError> {
    let content = std::fs::read_to_string(path).map_err(|source| BenchmarkError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut samples = Vec::new();
    let mut seen_ids = HashSet::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let malformed = |message: String| BenchmarkError::Malformed {
            path: path.to_path_buf(),
            line: line_no + 1,
            message,
        };

        let raw: RawSample = serde_json::from_str(line).map_err(|e| malformed(e.to_string()))?;
        let id = scalar_text(&raw.idx)
            .ok_or_else(|| malformed("idx must be a number or a string".to_string()))?;

        if !seen_ids.insert(id.clone()) {
            return Err(BenchmarkError::DuplicateId {
                path: path.to_path_buf(),
                id,
            });
        }

        let selection_set = match kind {
            TaskKind::Existence => {
                validate_existence(&id, &raw.answer)?;
                None
            }
            TaskKind::TypeInfer => {
                let choices = parse_selection(&id, raw.selection.as_deref())?;
                validate_type_infer(&id, &raw.answer, &choices)?;
                Some(choices)
            }
        };

        samples.push(BenchmarkSample {
            id,
            code: raw.code,
            gold_answer: raw.answer,
            selection_text: selection_set.as_ref().and(raw.selection),
            selection_set,
            cwe: scalar_text(&raw.cwe),
        });
    }

    info!(
        "Loaded {} {kind} samples from {}",
        samples.len(),
        path.display()
    );
    Ok(samples)
}
