//! JSON reports for analysis runs.

use chrono::{DateTime, NaiveDate, Utc};
use privcap_metrics::Horizon;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The builder was given no evaluation date.
    #[error("Report is missing an evaluation date")]
    MissingEvaluationDate,
}

/// A report for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Source the records came from (a file name, for example).
    pub source: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Evaluation date the metrics were computed against.
    pub evaluation_date: NaiveDate,

    /// Horizon used for annualized ROI.
    pub horizon: Horizon,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(
        source: String,
        evaluation_date: NaiveDate,
        horizon: Horizon,
        contents: serde_json::Value,
    ) -> Self {
        Self {
            source,
            timestamp: Utc::now(),
            evaluation_date,
            horizon,
            contents,
        }
    }

    /// Convert report to JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to(&self, writer: &mut impl std::io::Write) -> Result<(), ReportError> {
        let json = self.to_json()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    source: Option<String>,
    evaluation_date: Option<NaiveDate>,
    horizon: Option<Horizon>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the evaluation date.
    pub const fn evaluation_date(mut self, date: NaiveDate) -> Self {
        self.evaluation_date = Some(date);
        self
    }

    /// Set the horizon.
    pub const fn horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Set the report contents from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if `contents` cannot be represented as JSON.
    pub fn contents(mut self, contents: &impl Serialize) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(contents)?);
        Ok(self)
    }

    /// Build the report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingEvaluationDate`] if no date was set.
    pub fn build(self) -> Result<Report, ReportError> {
        let evaluation_date = self
            .evaluation_date
            .ok_or(ReportError::MissingEvaluationDate)?;
        Ok(Report::new(
            self.source.unwrap_or_default(),
            evaluation_date,
            self.horizon.unwrap_or_default(),
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}
