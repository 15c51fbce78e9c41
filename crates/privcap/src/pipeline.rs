//! End-to-end analysis pipeline.
//!
//! raw table -> column resolution -> normalization -> filters -> metrics ->
//! aggregates. Every stage produces new values; the input table is borrowed
//! and never modified.

use privcap_data::{ColumnMapping, DataError, RawTable, RowParseFailure, normalize, resolve_columns};
use privcap_metrics::{MetricKind, ScoredRecord};
use privcap_portfolio::{
    CumulativePoint, FundAggregate, PortfolioOverview, aggregate_by_fund, apply_filters,
    cumulative_cost_vs_value, overview,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AnalysisConfig;

/// Errors that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The table could not be normalized.
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Row and metric diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Data rows in the source table
    pub total_rows: usize,
    /// Rows excluded during normalization
    pub dropped_rows: usize,
    /// Why each excluded row was dropped
    pub failures: Vec<RowParseFailure>,
    /// Records removed by the filter
    pub filtered_out: usize,
    /// Records with an undefined value, per metric
    pub undefined_metrics: BTreeMap<MetricKind, usize>,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Column mapping that was applied
    pub mapping: ColumnMapping,
    /// Preset the mapping came from, if any
    pub preset: Option<String>,
    /// Records that passed normalization and filters, with their metrics
    pub records: Vec<ScoredRecord>,
    /// Per-fund aggregates
    pub funds: Vec<FundAggregate>,
    /// Cumulative cost versus fair value
    pub cumulative: Vec<CumulativePoint>,
    /// Whole-portfolio summary
    pub overview: PortfolioOverview,
    /// Row and metric diagnostics
    pub diagnostics: Diagnostics,
}

/// Run the full pipeline over `table`.
///
/// # Errors
///
/// Returns [`PipelineError::Data`] when a required column cannot be
/// resolved. Bad rows and undefined metrics are reported in
/// [`Analysis::diagnostics`] instead.
pub fn run_analysis(table: &RawTable, config: &AnalysisConfig) -> Result<Analysis, PipelineError> {
    let resolution = resolve_columns(table.headers(), &config.columns);
    debug!(
        preset = resolution.preset.as_deref().unwrap_or("none"),
        fields = resolution.mapping.len(),
        "resolved columns"
    );

    let normalized = normalize(table, &resolution.mapping)?;
    let records = apply_filters(&normalized.records, &config.filter);
    let filtered_out = normalized.records.len() - records.len();

    let engine = config.engine();
    let scored = engine.score(&records);
    let funds = aggregate_by_fund(&records, &engine);
    let cumulative = cumulative_cost_vs_value(&records);
    let overview = overview(&records, &engine);

    let diagnostics = Diagnostics {
        total_rows: normalized.diagnostics.total_rows,
        dropped_rows: normalized.diagnostics.dropped_count(),
        failures: normalized.diagnostics.failures,
        filtered_out,
        undefined_metrics: overview.undefined_counts.clone(),
    };

    info!(
        records = scored.len(),
        funds = funds.len(),
        dropped = diagnostics.dropped_rows,
        filtered_out,
        evaluation_date = %engine.evaluation_date(),
        "analysis complete"
    );

    Ok(Analysis {
        mapping: resolution.mapping,
        preset: resolution.preset,
        records: scored,
        funds,
        cumulative,
        overview,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use privcap_data::CanonicalField;

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            evaluation_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..AnalysisConfig::default()
        }
    }

    fn table(rows: &[[&str; 5]]) -> RawTable {
        let rows: Vec<Vec<&str>> = rows.iter().map(|row| row.to_vec()).collect();
        RawTable::from_strings(
            &["Investment Name", "Total Invested Amount", "Fair Value", "Date", "Fund Name"],
            &rows,
        )
        .unwrap()
    }

    #[test]
    fn test_small_portfolio() {
        let table = table(&[
            ["Acme", "100", "250", "2020-01-01", "Fund I"],
            ["Globex", "200", "100", "2021-06-01", "Fund II"],
        ]);
        let analysis = run_analysis(&table, &config()).unwrap();

        assert_eq!(analysis.preset.as_deref(), Some("Aduro"));
        assert_eq!(analysis.records.len(), 2);
        assert_eq!(analysis.records[0].metrics.moic, Some(2.5));
        assert_eq!(analysis.funds.len(), 2);
        assert_eq!(analysis.cumulative.len(), 2);
        assert_eq!(analysis.overview.record_count, 2);
        assert_eq!(analysis.diagnostics.dropped_rows, 0);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let table = RawTable::from_strings(
            &["Investment Name", "Fair Value", "Date"],
            &[vec!["Acme", "250", "2020-01-01"]],
        )
        .unwrap();
        let err = run_analysis(&table, &config()).unwrap_err();
        let PipelineError::Data(DataError::MissingRequiredColumn { fields }) = err else {
            panic!("expected missing column error");
        };
        assert_eq!(fields, vec![CanonicalField::Cost, CanonicalField::FundName]);
    }

    #[test]
    fn test_empty_table() {
        let analysis = run_analysis(&table(&[]), &config()).unwrap();
        assert!(analysis.records.is_empty());
        assert!(analysis.funds.is_empty());
        assert_eq!(analysis.overview.metrics.moic, None);
    }
}
