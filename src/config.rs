//! Analysis settings, loadable from YAML and overridable from the CLI.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Rows kept in "top N" frequency and rate charts.
    pub top: usize,
    pub change_reason_top: usize,
    /// Contacts-per-order buckets shown in the distribution chart.
    pub distribution_limit: usize,
    pub focus_brand: String,
    pub focus_brand_top: usize,
    pub focus_partner: String,
    pub metrics_file: String,
    pub charts: bool,
    pub json: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top: 10,
            change_reason_top: 5,
            distribution_limit: 23,
            focus_brand: "Brand A".to_string(),
            focus_brand_top: 5,
            focus_partner: "Partner CO".to_string(),
            metrics_file: "key_metrics.txt".to_string(),
            charts: true,
            json: false,
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: AnalysisConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.metrics_file.trim().is_empty(),
            "metrics_file cannot be empty"
        );
        ensure!(
            !self.metrics_file.contains(['/', '\\']),
            "metrics_file must be a plain file name, got '{}'",
            self.metrics_file
        );
        Ok(())
    }
}
