use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// One selectable dataset: display name and file name under `input_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub name: String,
    pub file: String,
}

impl DatasetSource {
    fn new(name: &str, file: &str) -> Self {
        DatasetSource {
            name: name.to_string(),
            file: file.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the raw CSV files.
    pub input_dir: PathBuf,
    /// Directory receiving `<name>_cleaned.csv` files.
    pub output_dir: PathBuf,
    /// Datasets offered in the selector, in display order.
    pub datasets: Vec<DatasetSource>,
    /// Upper bound on points drawn per line or scatter series.
    pub max_plot_points: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/original_datasets"),
            output_dir: PathBuf::from("data/cleaned_datasets"),
            datasets: vec![
                DatasetSource::new("Benin Malanville", "benin-malanville.csv"),
                DatasetSource::new("Sierra Leone Bumbuna", "sierraleone-bumbuna.csv"),
                DatasetSource::new("Togo Dapaong QC", "togo-dapaong_qc.csv"),
            ],
            max_plot_points: 5000,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON configuration file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Use `dashboard.json` when it exists and parses, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No {} found, using default configuration", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring configuration: {e:#}");
                Self::default()
            }
        }
    }

    pub fn source_path(&self, source: &DatasetSource) -> PathBuf {
        self.input_dir.join(&source.file)
    }

    pub fn cleaned_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(cleaned_file_name(name))
    }
}

/// `"Benin Malanville"` → `"benin_malanville_cleaned.csv"`.
pub fn cleaned_file_name(name: &str) -> String {
    format!("{}_cleaned.csv", name.to_lowercase().replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaned_names_are_derived_from_display_name() {
        assert_eq!(
            cleaned_file_name("Sierra Leone Bumbuna"),
            "sierra_leone_bumbuna_cleaned.csv"
        );
        let config = DashboardConfig::default();
        assert_eq!(
            config.cleaned_path("Togo Dapaong QC"),
            PathBuf::from("data/cleaned_datasets/togo_dapaong_qc_cleaned.csv")
        );
        assert_eq!(
            config.source_path(&config.datasets[0]),
            PathBuf::from("data/original_datasets/benin-malanville.csv")
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "input_dir": "/srv/solar", "max_plot_points": 100 }"#).unwrap();

        let config = DashboardConfig::load_or_default(&path);
        assert_eq!(config.input_dir, PathBuf::from("/srv/solar"));
        assert_eq!(config.max_plot_points, 100);
        assert_eq!(config.datasets.len(), 3);
    }

    #[test]
    fn malformed_or_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }
}
