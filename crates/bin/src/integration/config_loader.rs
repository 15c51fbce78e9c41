//! Configuration from files and command-line flags.
//!
//! The config file (`--config`, or the platform default when present) is
//! loaded first; flags given on the command line override it field by field.

use chrono::NaiveDate;
use clap::Args;
use privcap::{AnalysisConfig, ConfigError, default_config_path};
use privcap_data::{ColumnMapping, DataError, ResolutionMode};
use privcap_metrics::{Horizon, ParseHorizonError};
use privcap_portfolio::Bounds;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors from turning flags into configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigLoadError {
    /// Config file error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Bad `--preset` or `--map` value.
    #[error("Invalid column option: {0}")]
    Columns(#[from] DataError),
    /// Bad `--horizon` value.
    #[error(transparent)]
    Horizon(#[from] ParseHorizonError),
}

/// Flags shared by every command that reads an input table.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct InputArgs {
    /// Column mode: auto, custom, or a preset name (Salesforce, Aduro)
    #[arg(long)]
    pub(crate) preset: Option<String>,

    /// Map a field to a source header, e.g. --map "Cost=Paid In" (repeatable)
    #[arg(long = "map", value_name = "FIELD=HEADER")]
    pub(crate) mappings: Vec<String>,

    /// Evaluation date (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub(crate) as_of: Option<NaiveDate>,

    /// Annualization horizon: inception, 1y, 3y or 5y
    #[arg(long)]
    pub(crate) horizon: Option<String>,

    /// Keep only this fund (repeatable)
    #[arg(long = "fund", value_name = "NAME")]
    pub(crate) funds: Vec<String>,

    /// Earliest investment date to keep
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub(crate) from: Option<NaiveDate>,

    /// Latest investment date to keep
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub(crate) to: Option<NaiveDate>,

    /// Keep only realized investments
    #[arg(long, conflicts_with = "unrealized")]
    pub(crate) realized: bool,

    /// Keep only unrealized investments
    #[arg(long)]
    pub(crate) unrealized: bool,

    /// Minimum MOIC to keep
    #[arg(long)]
    pub(crate) min_moic: Option<f64>,

    /// Maximum MOIC to keep
    #[arg(long)]
    pub(crate) max_moic: Option<f64>,

    /// Config file (default: the platform config directory, if present)
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
}

/// Load the config file, then apply command-line overrides.
pub(crate) fn build_config(args: &InputArgs) -> Result<AnalysisConfig, ConfigLoadError> {
    let base = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => {
            debug!(path = ?default_config_path(), "checking default config");
            AnalysisConfig::load_default()?
        }
    };
    apply_overrides(base, args)
}

/// Overlay flags onto `config`. Unset flags leave the config untouched.
pub(crate) fn apply_overrides(
    mut config: AnalysisConfig,
    args: &InputArgs,
) -> Result<AnalysisConfig, ConfigLoadError> {
    if let Some(mode) = &args.preset {
        config.columns.mode = mode.parse::<ResolutionMode>()?;
    }
    if !args.mappings.is_empty() {
        let bindings = args
            .mappings
            .iter()
            .map(|b| ColumnMapping::parse_binding(b))
            .collect::<Result<Vec<_>, _>>()?;
        for (field, header) in bindings {
            config.columns.overrides.insert(field, header);
        }
    }
    if let Some(date) = args.as_of {
        config.evaluation_date = Some(date);
    }
    if let Some(horizon) = &args.horizon {
        config.horizon = horizon.parse::<Horizon>()?;
    }

    let filter = &mut config.filter;
    if !args.funds.is_empty() {
        filter.fund_names.clone_from(&args.funds);
    }
    if args.from.is_some() || args.to.is_some() {
        let current = filter.date_range.unwrap_or_default();
        filter.date_range = Some(Bounds::new(args.from.or(current.min), args.to.or(current.max)));
    }
    if args.realized {
        filter.realized = Some(true);
    } else if args.unrealized {
        filter.realized = Some(false);
    }
    if args.min_moic.is_some() || args.max_moic.is_some() {
        let current = filter.moic_range.unwrap_or_default();
        filter.moic_range = Some(Bounds::new(
            args.min_moic.or(current.min),
            args.max_moic.or(current.max),
        ));
    }

    Ok(config)
}
