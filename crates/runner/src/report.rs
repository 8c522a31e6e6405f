//! Report persistence

use std::path::PathBuf;
use tracing::info;
use vulnrag_core::error::{Result, ResultExt};
use vulnrag_core::ReportConfig;
use vulnrag_evaluator::{SimplifiedReport, TaskReport};

/// Writes the final report as one JSON document
#[derive(Debug, Clone)]
pub struct ReportWriter {
    save_dir: Option<PathBuf>,
    result_name: String,
    verbose: bool,
}

impl ReportWriter {
    pub fn new(save_dir: Option<PathBuf>, result_name: impl Into<String>, verbose: bool) -> Self {
        Self {
            save_dir,
            result_name: result_name.into(),
            verbose,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(
            config.save_dir.clone(),
            config.result_name.clone(),
            config.verbose,
        )
    }

    /// Pretty JSON: every task report, or only overall metrics by task name
    pub fn render(&self, reports: &[TaskReport]) -> Result<String> {
        let json = if self.verbose {
            serde_json::to_string_pretty(reports)?
        } else {
            serde_json::to_string_pretty(&SimplifiedReport::from_reports(reports))?
        };
        Ok(json)
    }

    /// Write to `<save_dir>/<result_name>`, or print to stdout without a save dir.
    /// Returns the written path.
    pub fn persist(&self, reports: &[TaskReport]) -> Result<Option<PathBuf>> {
        let json = self.render(reports)?;

        let Some(save_dir) = &self.save_dir else {
            println!("{json}");
            return Ok(None);
        };

        std::fs::create_dir_all(save_dir)
            .context(format!("Failed to create {}", save_dir.display()))?;
        let path = save_dir.join(&self.result_name);
        std::fs::write(&path, json).context(format!("Failed to write {}", path.display()))?;

        info!("Evaluation report saved to {}", path.display());
        Ok(Some(path))
    }
}
