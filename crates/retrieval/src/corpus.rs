//! Historical vulnerability exemplars aligned with the index

use crate::error::{Result, RetrievalError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One historical vulnerability; extra fields in the corpus file are ignored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExemplarRecord {
    pub cve_id: String,
    #[serde(default)]
    pub cwe_id: String,
    #[serde(default)]
    pub description: String,
    pub code_before: String,
}

/// Ordered exemplar records; record `i` corresponds to index item `i`
#[derive(Debug, Clone, Default)]
pub struct ExemplarCorpus {
    records: Vec<ExemplarRecord>,
}

impl ExemplarCorpus {
    pub fn from_records(records: Vec<ExemplarRecord>) -> Self {
        Self { records }
    }

    /// Load a JSONL corpus; blank lines are skipped
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RetrievalError::CorpusLoad(format!("{}: {e}", path.display())))?;

        let mut records = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: ExemplarRecord = serde_json::from_str(line).map_err(|e| {
                RetrievalError::CorpusLoad(format!("{}:{}: {e}", path.display(), line_no + 1))
            })?;
            records.push(record);
        }

        info!(
            "Loaded {} exemplar records from {}",
            records.len(),
            path.display()
        );
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ExemplarRecord> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[ExemplarRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_load_ignores_extra_fields_and_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corpus.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"cve_id":"CVE-2021-0001","cwe_id":"CWE-787","description":"overflow","code_before":"memcpy(a,b,n);","code_after":"fixed"}"#,
                "\n\n",
                r#"{"cve_id":"CVE-2021-0002","code_before":"free(p); free(p);"}"#,
                "\n"
            ),
        )
        .unwrap();

        let corpus = ExemplarCorpus::load(&path).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(0).unwrap().cwe_id, "CWE-787");
        assert_eq!(corpus.get(1).unwrap().description, "");
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corpus.jsonl");
        std::fs::write(&path, "{\"cve_id\":\"a\",\"code_before\":\"x\"}\nnot json\n").unwrap();

        match ExemplarCorpus::load(&path) {
            Err(RetrievalError::CorpusLoad(msg)) => assert!(msg.contains(":2:"), "{msg}"),
            other => panic!("expected CorpusLoad, got {other:?}"),
        }
    }
}
