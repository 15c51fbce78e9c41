//! Analysis configuration.
//!
//! Configuration is plain serde data, loaded from a JSON file and then
//! overridden by whatever the caller sets explicitly. The default location
//! is platform-specific:
//! - Linux: `~/.config/privcap/config.json`
//! - macOS: `~/Library/Application Support/privcap/config.json`
//! - Windows: `%APPDATA%\privcap\config.json`

use chrono::{Local, NaiveDate};
use privcap_data::ResolveOptions;
use privcap_metrics::{Horizon, MetricsEngine, SolverConfig};
use privcap_portfolio::RecordFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("Invalid config {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// Everything a pipeline run needs besides the table itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Evaluation date (default: today)
    pub evaluation_date: Option<NaiveDate>,
    /// Annualization horizon (default: since inception)
    pub horizon: Horizon,
    /// Column resolution mode and manual overrides
    pub columns: ResolveOptions,
    /// Record filter applied before metrics
    pub filter: RecordFilter,
    /// XIRR solver settings
    pub solver: SolverConfig,
}

impl AnalysisConfig {
    /// Parse configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid configuration.
    pub fn from_json(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text, path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load the default config file if it exists, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Evaluation date, falling back to today's local date.
    pub fn evaluation_date_or_today(&self) -> NaiveDate {
        self.evaluation_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Metrics engine for this configuration.
    pub fn engine(&self) -> MetricsEngine {
        MetricsEngine::new(self.evaluation_date_or_today())
            .with_horizon(self.horizon)
            .with_solver(self.solver)
    }
}

/// Get the default config directory path.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("privcap"))
}

/// Get the default config file path.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|dir| dir.join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use privcap_data::{CanonicalField, ResolutionMode};

    #[test]
    fn test_empty_json_is_default() {
        let config = AnalysisConfig::from_json("{}", Path::new("config.json")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.solver.max_iterations, 100);
    }

    #[test]
    fn test_full_json() {
        let json = r#"{
            "evaluation_date": "2024-06-30",
            "horizon": "3y",
            "columns": {
                "mode": { "preset": "Aduro" },
                "overrides": { "Cost": "Paid In" }
            },
            "filter": {
                "fund_names": ["Fund II"],
                "moic_range": { "min": 1.0 },
                "realized": false
            },
            "solver": { "max_iterations": 250 }
        }"#;
        let config = AnalysisConfig::from_json(json, Path::new("config.json")).unwrap();

        assert_eq!(config.evaluation_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(config.horizon, Horizon::ThreeYears);
        assert_eq!(config.columns.mode, ResolutionMode::Preset("Aduro".into()));
        assert_eq!(config.columns.overrides.get(CanonicalField::Cost), Some("Paid In"));
        assert_eq!(config.filter.fund_names, vec!["Fund II".to_string()]);
        assert_eq!(config.filter.moic_range.unwrap().max, None);
        assert_eq!(config.filter.realized, Some(false));
        assert_eq!(config.solver.max_iterations, 250);
        assert_eq!(config.solver.tolerance, 1e-7);

        let engine = config.engine();
        assert_eq!(engine.evaluation_date(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(engine.horizon(), Horizon::ThreeYears);
    }

    #[test]
    fn test_invalid_json() {
        let err = AnalysisConfig::from_json(r#"{"horizon": "10y"}"#, Path::new("bad.json"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_missing_file() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/privcap/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("privcap/config.json"));
        }
    }
}
