//! Record normalization.
//!
//! Turns a [`RawTable`] plus a resolved [`ColumnMapping`] into typed
//! [`InvestmentRecord`]s. A missing required column fails the whole dataset;
//! a bad cell only drops its row.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::columns::{CanonicalField, ColumnMapping};
use crate::error::{DataError, Result};
use crate::table::{RawTable, RowView};

/// One normalized investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    /// Investment identifier
    pub name: String,
    /// Owning fund
    pub fund: String,
    /// Capital invested
    pub cost: f64,
    /// Current valuation
    pub fair_value: f64,
    /// Date the capital was deployed
    pub investment_date: NaiveDate,
    /// Company stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// City
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Whether the position has been realized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized: Option<bool>,
}

impl InvestmentRecord {
    /// Create a record with only the required fields.
    pub fn new(
        name: impl Into<String>,
        fund: impl Into<String>,
        cost: f64,
        fair_value: f64,
        investment_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            fund: fund.into(),
            cost,
            fair_value,
            investment_date,
            stage: None,
            city: None,
            state: None,
            realized: None,
        }
    }

    /// Set the realized flag.
    pub const fn with_realized(mut self, realized: bool) -> Self {
        self.realized = Some(realized);
        self
    }
}

/// Why a row was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowIssue {
    /// The cell was empty
    Missing,
    /// The cell is not a number
    InvalidNumber {
        /// Raw cell text
        value: String,
    },
    /// The cell is not a recognizable date
    InvalidDate {
        /// Raw cell text
        value: String,
    },
}

/// A row dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowParseFailure {
    /// Zero-based row index in the source table
    pub row: usize,
    /// Field that failed
    pub field: CanonicalField,
    /// What was wrong
    pub issue: RowIssue,
}

impl fmt::Display for RowParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            RowIssue::Missing => write!(f, "row {}: missing {}", self.row, self.field),
            RowIssue::InvalidNumber { value } => {
                write!(f, "row {}: {} is not a number: {:?}", self.row, self.field, value)
            }
            RowIssue::InvalidDate { value } => {
                write!(f, "row {}: {} is not a date: {:?}", self.row, self.field, value)
            }
        }
    }
}

/// Non-fatal findings from normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeDiagnostics {
    /// Number of rows in the source table
    pub total_rows: usize,
    /// One entry per dropped row (first failing field)
    pub failures: Vec<RowParseFailure>,
}

impl NormalizeDiagnostics {
    /// Number of rows excluded.
    pub fn dropped_count(&self) -> usize {
        self.failures.len()
    }
}

/// Normalization output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    /// Valid records in source order
    pub records: Vec<InvestmentRecord>,
    /// Dropped rows
    pub diagnostics: NormalizeDiagnostics,
}

struct Columns {
    name: usize,
    fund: usize,
    cost: usize,
    fair_value: usize,
    date: usize,
    stage: Option<usize>,
    city: Option<usize>,
    state: Option<usize>,
    realized: Option<usize>,
}

impl Columns {
    fn locate(table: &RawTable, mapping: &ColumnMapping) -> Result<Self> {
        let find = |field: CanonicalField| mapping.get(field).and_then(|h| table.column_index(h));

        let missing: Vec<CanonicalField> = CanonicalField::REQUIRED
            .into_iter()
            .filter(|f| find(*f).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingRequiredColumn { fields: missing });
        }
        if let Some((field, header)) = mapping
            .iter()
            .find(|(field, header)| field.is_required() && table.is_repeated(header))
        {
            return Err(DataError::AmbiguousColumn {
                field,
                header: header.to_string(),
            });
        }

        let required = |field: CanonicalField| {
            find(field).ok_or(DataError::MissingRequiredColumn { fields: vec![field] })
        };

        Ok(Self {
            name: required(CanonicalField::InvestmentName)?,
            fund: required(CanonicalField::FundName)?,
            cost: required(CanonicalField::Cost)?,
            fair_value: required(CanonicalField::FairValue)?,
            date: required(CanonicalField::Date)?,
            stage: find(CanonicalField::Stage),
            city: find(CanonicalField::City),
            state: find(CanonicalField::State),
            realized: find(CanonicalField::Realized),
        })
    }

    fn record(&self, row: &RowView<'_>) -> std::result::Result<InvestmentRecord, RowParseFailure> {
        let fail = |field: CanonicalField, issue: RowIssue| RowParseFailure {
            row: row.index(),
            field,
            issue,
        };
        let text = |column: usize, field: CanonicalField| {
            row.cell(column).ok_or_else(|| fail(field, RowIssue::Missing))
        };

        let name = text(self.name, CanonicalField::InvestmentName)?;
        let fund = text(self.fund, CanonicalField::FundName)?;

        let cost_text = text(self.cost, CanonicalField::Cost)?;
        let cost = parse_number(cost_text).ok_or_else(|| {
            fail(CanonicalField::Cost, RowIssue::InvalidNumber { value: cost_text.to_string() })
        })?;

        let fv_text = text(self.fair_value, CanonicalField::FairValue)?;
        let fair_value = parse_number(fv_text).ok_or_else(|| {
            fail(CanonicalField::FairValue, RowIssue::InvalidNumber { value: fv_text.to_string() })
        })?;

        let date_text = text(self.date, CanonicalField::Date)?;
        let investment_date = parse_date(date_text).ok_or_else(|| {
            fail(CanonicalField::Date, RowIssue::InvalidDate { value: date_text.to_string() })
        })?;

        let optional = |column: Option<usize>| column.and_then(|c| row.cell(c)).map(str::to_string);

        Ok(InvestmentRecord {
            name: name.to_string(),
            fund: fund.to_string(),
            cost,
            fair_value,
            investment_date,
            stage: optional(self.stage),
            city: optional(self.city),
            state: optional(self.state),
            realized: self.realized.and_then(|c| row.cell(c)).and_then(parse_realized),
        })
    }
}

/// Normalize a raw table into investment records.
///
/// # Errors
///
/// Returns [`DataError::MissingRequiredColumn`] if any required field is
/// unbound or bound to a header the table does not have, and
/// [`DataError::AmbiguousColumn`] if one is bound to a repeated header.
/// Row-level problems never produce an error.
pub fn normalize(table: &RawTable, mapping: &ColumnMapping) -> Result<NormalizedTable> {
    let columns = Columns::locate(table, mapping)?;

    let mut output = NormalizedTable {
        records: Vec::with_capacity(table.len()),
        diagnostics: NormalizeDiagnostics { total_rows: table.len(), failures: Vec::new() },
    };

    for row in table.rows() {
        match columns.record(&row) {
            Ok(record) => output.records.push(record),
            Err(failure) => {
                tracing::debug!(%failure, "dropping row");
                output.diagnostics.failures.push(failure);
            }
        }
    }

    if output.diagnostics.dropped_count() > 0 {
        tracing::warn!(
            dropped = output.diagnostics.dropped_count(),
            total = output.diagnostics.total_rows,
            "rows excluded during normalization"
        );
    }

    Ok(output)
}

/// Parse a monetary cell.
///
/// Accepts surrounding whitespace, currency symbols, thousands separators and
/// accounting-style negatives such as `(1,000)`.
pub fn parse_number(text: &str) -> Option<f64> {
    let mut s = text.trim();
    let mut negative = false;

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.trim_start();
    }

    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() || cleaned.starts_with(['-', '+']) {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a date cell in any of the common spreadsheet export formats.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Parse a realized/unrealized status cell.
pub fn parse_realized(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "unrealized" | "no" | "n" | "false" | "0" => Some(false),
        "realized" | "yes" | "y" | "true" | "1" | "exited" => Some(true),
        _ => None,
    }
}
