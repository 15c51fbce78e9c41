#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/privcap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod pipeline;

// Re-export main types from sub-crates
pub use privcap_data as data;
pub use privcap_metrics as metrics;
pub use privcap_output as output;
pub use privcap_portfolio as portfolio;

pub use config::{AnalysisConfig, ConfigError, default_config_dir, default_config_path};
pub use pipeline::{Analysis, Diagnostics, PipelineError, run_analysis};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
