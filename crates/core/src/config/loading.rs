//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `VULNRAG_` and use double underscores
    /// for nested values. For example:
    /// - `VULNRAG_RETRIEVAL__THRESHOLD=0.1`
    /// - `VULNRAG_MODEL__MODEL=deepseek-reasoner`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // Numeric defaults are set explicitly so that env overrides of sibling
        // keys still deserialize into a complete section
        let builder = set_config_default(
            builder,
            "retrieval.threshold",
            f64::from(default_threshold()),
        )?;
        let builder = set_config_default(builder, "retrieval.top_k", default_top_k() as i64)?;
        let builder =
            set_config_default(builder, "model.timeout_secs", default_timeout_secs() as i64)?;
        let mut builder = set_config_default(builder, "report.verbose", default_true())?;

        // Add the config file if it exists
        if path.exists() {
            debug!("Loading config from {}", path.display());
            builder = builder.add_source(File::from(path));
        } else {
            debug!("No config file at {}, using defaults", path.display());
        }

        // Add environment variables with VULNRAG_ prefix
        builder = builder.add_source(
            Environment::with_prefix("VULNRAG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.vulnrag/config.toml or custom --config path)
    /// 3. Environment variables (VULNRAG_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
