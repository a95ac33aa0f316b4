//! Dashboard configuration: a JSON file with every field defaulted.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sporeprint_classifiers::config::DataConfig;

/// Settings shared by the `serve` and `classify` commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    /// Socket address the dashboard listens on.
    pub bind: String,
    /// Seed handed to stochastic learners.
    pub random_state: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            bind: "127.0.0.1:8501".to_string(),
            random_state: 0,
        }
    }
}

/// Load a dashboard configuration from a JSON file.
pub fn load_dashboard_config<P: AsRef<Path>>(path: P) -> Result<DashboardConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: DashboardConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

/// The dataset must be an existing `.csv` file.
pub fn validate_csv_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    if ext.as_deref() != Some("csv") {
        anyhow::bail!("File must have a .csv extension: {}", path.display());
    }
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    Ok(())
}
