//! Export of investment metrics as flat tables.
//!
//! Record, fund and cumulative tables can be written as CSV or JSON.
//! Undefined metrics become empty CSV cells and JSON `null`.

use chrono::NaiveDate;
use privcap_metrics::ScoredRecord;
use privcap_portfolio::{CumulativePoint, FundAggregate};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized CSV was not valid UTF-8.
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Pick the format from a file extension. JSON files are pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        [Self::Csv, Self::PrettyJson]
            .into_iter()
            .find(|format| extension.as_deref() == Some(format.extension()))
            .ok_or_else(|| {
                ExportError::InvalidFormat(format!(
                    "{} (expected a .csv or .json file)",
                    path.display()
                ))
            })
    }
}

/// One investment in the exported record table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRow {
    /// Investment name.
    #[serde(rename = "Investment Name")]
    pub investment_name: String,

    /// Fund name.
    #[serde(rename = "Fund Name")]
    pub fund_name: String,

    /// Cost.
    #[serde(rename = "Cost")]
    pub cost: f64,

    /// Fair value.
    #[serde(rename = "Fair Value")]
    pub fair_value: f64,

    /// Multiple on invested capital.
    #[serde(rename = "MOIC")]
    pub moic: Option<f64>,

    /// Return on investment.
    #[serde(rename = "ROI")]
    pub roi: Option<f64>,

    /// Annualized ROI.
    #[serde(rename = "Annualized ROI")]
    pub annualized_roi: Option<f64>,

    /// Internal rate of return.
    #[serde(rename = "IRR")]
    pub irr: Option<f64>,
}

impl From<&ScoredRecord> for ExportRow {
    fn from(scored: &ScoredRecord) -> Self {
        Self {
            investment_name: scored.record.name.clone(),
            fund_name: scored.record.fund.clone(),
            cost: scored.record.cost,
            fair_value: scored.record.fair_value,
            moic: scored.metrics.moic,
            roi: scored.metrics.roi,
            annualized_roi: scored.metrics.annualized_roi,
            irr: scored.metrics.irr,
        }
    }
}

/// One fund in the exported fund table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundExportRow {
    /// Fund name.
    #[serde(rename = "Fund Name")]
    pub fund_name: String,

    /// Number of investments.
    #[serde(rename = "Investments")]
    pub record_count: usize,

    /// Total cost.
    #[serde(rename = "Total Cost")]
    pub total_cost: f64,

    /// Total fair value.
    #[serde(rename = "Total Fair Value")]
    pub total_fair_value: f64,

    /// Group MOIC.
    #[serde(rename = "MOIC")]
    pub moic: Option<f64>,

    /// Group ROI.
    #[serde(rename = "ROI")]
    pub roi: Option<f64>,

    /// Cost-weighted annualized ROI.
    #[serde(rename = "Annualized ROI")]
    pub annualized_roi: Option<f64>,

    /// Merged-cash-flow IRR.
    #[serde(rename = "IRR")]
    pub irr: Option<f64>,

    /// Cost that MOIC and ROI are computed on.
    #[serde(rename = "Basis Cost")]
    pub basis_cost: f64,

    /// Fair value that MOIC is computed on.
    #[serde(rename = "Basis Fair Value")]
    pub basis_fair_value: f64,
}

impl From<&FundAggregate> for FundExportRow {
    fn from(fund: &FundAggregate) -> Self {
        Self {
            fund_name: fund.fund_name.clone(),
            record_count: fund.record_count,
            total_cost: fund.total_cost,
            total_fair_value: fund.total_fair_value,
            moic: fund.metrics.moic,
            roi: fund.metrics.roi,
            annualized_roi: fund.metrics.annualized_roi,
            irr: fund.metrics.irr,
            basis_cost: fund.basis_cost,
            basis_fair_value: fund.basis_fair_value,
        }
    }
}

/// One date in the exported cumulative series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CumulativeExportRow {
    /// Investment date.
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    /// Cost invested on the date.
    #[serde(rename = "Cost")]
    pub cost: f64,

    /// Fair value of investments made on the date.
    #[serde(rename = "Fair Value")]
    pub fair_value: f64,

    /// Running cost.
    #[serde(rename = "Cumulative Cost")]
    pub cumulative_cost: f64,

    /// Running fair value.
    #[serde(rename = "Cumulative Fair Value")]
    pub cumulative_fair_value: f64,
}

impl From<&CumulativePoint> for CumulativeExportRow {
    fn from(point: &CumulativePoint) -> Self {
        Self {
            date: point.date,
            cost: point.cost,
            fair_value: point.fair_value,
            cumulative_cost: point.cumulative_cost,
            cumulative_fair_value: point.cumulative_fair_value,
        }
    }
}

/// Flatten scored records into export rows, preserving order.
pub fn record_rows(scored: &[ScoredRecord]) -> Vec<ExportRow> {
    scored.iter().map(ExportRow::from).collect()
}

/// Flatten fund aggregates into export rows.
pub fn fund_rows(funds: &[FundAggregate]) -> Vec<FundExportRow> {
    funds.iter().map(FundExportRow::from).collect()
}

/// Flatten the cumulative series into export rows.
pub fn cumulative_rows(series: &[CumulativePoint]) -> Vec<CumulativeExportRow> {
    series.iter().map(CumulativeExportRow::from).collect()
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn rows_to_string<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for row in rows {
                wtr.serialize(row)?;
            }
            let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
            Ok(String::from_utf8(bytes)?)
        }
        ExportFormat::Json => Ok(serde_json::to_string(rows)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(rows)?),
    }
}

impl Exporter for Vec<ExportRow> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        rows_to_string(self, format)
    }
}

impl Exporter for Vec<FundExportRow> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        rows_to_string(self, format)
    }
}

impl Exporter for Vec<CumulativeExportRow> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        rows_to_string(self, format)
    }
}
