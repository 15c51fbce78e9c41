//! Portfolio summary tables.
//!
//! Renders the portfolio overview, per-fund aggregates and top-N rankings as
//! ASCII tables for the terminal or as Markdown.

use privcap_metrics::{Horizon, MetricKind, MetricSet, ScoredRecord};
use privcap_portfolio::{FundAggregate, PortfolioOverview, SortOrder};
use serde::{Deserialize, Serialize};
use std::fmt;

const WIDTH: usize = 96;
const BASIS_NOTE: &str = "MOIC and ROI exclude investments with zero or negative cost.";

/// Format a multiple like `2.50x`; undefined values print as `n/a`.
pub fn format_multiple(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}x"))
}

/// Format a rate as a percentage; undefined values print as `n/a`.
pub fn format_rate(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

/// Format a metric according to its kind.
pub fn format_metric(kind: MetricKind, metrics: &MetricSet) -> String {
    let value = metrics.get(kind);
    if kind.info().is_rate {
        format_rate(value)
    } else {
        format_multiple(value)
    }
}

/// Format an amount with thousands separators and two decimals.
pub fn format_amount(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{:02}", cents % 100)
}

/// Overview plus per-fund breakdown for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSummary {
    /// Title shown at the top.
    pub title: String,

    /// Horizon used for annualized ROI.
    pub horizon: Horizon,

    /// Whole-portfolio figures.
    pub overview: PortfolioOverview,

    /// Per-fund figures.
    pub funds: Vec<FundAggregate>,

    /// Rows read from the source table.
    pub total_rows: usize,

    /// Rows excluded during normalization.
    pub dropped_rows: usize,
}

impl PortfolioSummary {
    /// Create a summary with no row diagnostics.
    pub fn new(
        title: impl Into<String>,
        horizon: Horizon,
        overview: PortfolioOverview,
        funds: Vec<FundAggregate>,
    ) -> Self {
        let total_rows = overview.record_count;
        Self {
            title: title.into(),
            horizon,
            overview,
            funds,
            total_rows,
            dropped_rows: 0,
        }
    }

    /// Attach row counts from normalization.
    pub const fn with_rows(mut self, total_rows: usize, dropped_rows: usize) -> Self {
        self.total_rows = total_rows;
        self.dropped_rows = dropped_rows;
        self
    }

    fn overview_lines(&self) -> Vec<(&'static str, String)> {
        let o = &self.overview;
        let mut lines = vec![
            ("Evaluation Date", o.evaluation_date.to_string()),
            ("Horizon", self.horizon.to_string()),
            ("Investments", o.record_count.to_string()),
            ("Funds", o.fund_count.to_string()),
            ("Total Cost", format_amount(o.total_cost)),
            ("Total Fair Value", format_amount(o.total_fair_value)),
            ("Total Gain", format_amount(o.total_gain())),
            ("MOIC", format_multiple(o.metrics.moic)),
            ("ROI", format_rate(o.metrics.roi)),
            ("Annualized ROI", format_rate(o.metrics.annualized_roi)),
            ("IRR", format_rate(o.metrics.irr)),
        ];
        if let Some(multiples) = &o.realization {
            lines.push(("DPI", format_multiple(multiples.dpi)));
            lines.push(("RVPI", format_multiple(multiples.rvpi)));
            lines.push(("TVPI", format_multiple(multiples.tvpi)));
        }
        lines
    }

    fn undefined_line(&self) -> Option<String> {
        let parts: Vec<String> = self
            .overview
            .undefined_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(kind, count)| format!("{kind}: {count}"))
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }

    fn excludes_records(&self) -> bool {
        self.funds.iter().any(FundAggregate::excludes_records)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title));
        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');

        output.push_str("\nPortfolio:\n");
        output.push_str(&"-".repeat(WIDTH));
        output.push('\n');
        for (label, value) in self.overview_lines() {
            output.push_str(&format!("  {:<24}{}\n", format!("{label}:"), value));
        }

        if !self.funds.is_empty() {
            output.push_str("\nBy Fund:\n");
            output.push_str(&"-".repeat(WIDTH));
            output.push('\n');
            output.push_str(&format!(
                "{:<24} {:>5} {:>16} {:>16} {:>8} {:>9} {:>9} {:>9}\n",
                "Fund", "Count", "Cost", "Fair Value", "MOIC", "ROI", "Ann. ROI", "IRR"
            ));
            output.push_str(&"-".repeat(WIDTH));
            output.push('\n');

            for fund in &self.funds {
                output.push_str(&format!(
                    "{:<24} {:>5} {:>16} {:>16} {:>8} {:>9} {:>9} {:>9}\n",
                    fund.fund_name,
                    fund.record_count,
                    format_amount(fund.total_cost),
                    format_amount(fund.total_fair_value),
                    format_multiple(fund.metrics.moic),
                    format_rate(fund.metrics.roi),
                    format_rate(fund.metrics.annualized_roi),
                    format_rate(fund.metrics.irr)
                ));
            }
            if self.excludes_records() {
                output.push_str(&format!("  {BASIS_NOTE}\n"));
            }
        }

        output.push_str("\nDiagnostics:\n");
        output.push_str(&"-".repeat(WIDTH));
        output.push('\n');
        output.push_str(&format!(
            "  Rows read: {}, dropped: {}\n",
            self.total_rows, self.dropped_rows
        ));
        if let Some(undefined) = self.undefined_line() {
            output.push_str(&format!("  Undefined metrics: {undefined}\n"));
        }

        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", self.title));

        output.push_str("## Portfolio\n\n");
        for (label, value) in self.overview_lines() {
            output.push_str(&format!("- **{label}:** {value}\n"));
        }
        output.push('\n');

        if !self.funds.is_empty() {
            output.push_str("## By Fund\n\n");
            output.push_str(
                "| Fund | Investments | Cost | Fair Value | MOIC | ROI | Annualized ROI | IRR |\n",
            );
            output.push_str(
                "|------|-------------|------|------------|------|-----|----------------|-----|\n",
            );
            for fund in &self.funds {
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                    fund.fund_name,
                    fund.record_count,
                    format_amount(fund.total_cost),
                    format_amount(fund.total_fair_value),
                    format_multiple(fund.metrics.moic),
                    format_rate(fund.metrics.roi),
                    format_rate(fund.metrics.annualized_roi),
                    format_rate(fund.metrics.irr)
                ));
            }
            if self.excludes_records() {
                output.push_str(&format!("\n_{BASIS_NOTE}_\n"));
            }
            output.push('\n');
        }

        output.push_str("## Diagnostics\n\n");
        output.push_str(&format!(
            "- **Rows read:** {}\n- **Rows dropped:** {}\n",
            self.total_rows, self.dropped_rows
        ));
        if let Some(undefined) = self.undefined_line() {
            output.push_str(&format!("- **Undefined metrics:** {undefined}\n"));
        }

        output
    }
}

impl fmt::Display for PortfolioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.overview;
        writeln!(
            f,
            "{} ({} investments, {} funds, as of {})",
            self.title, o.record_count, o.fund_count, o.evaluation_date
        )?;
        writeln!(f, "  MOIC: {}", format_multiple(o.metrics.moic))?;
        writeln!(f, "  ROI: {}", format_rate(o.metrics.roi))?;
        writeln!(f, "  Annualized ROI: {}", format_rate(o.metrics.annualized_roi))?;
        writeln!(f, "  IRR: {}", format_rate(o.metrics.irr))?;
        Ok(())
    }
}

/// Records ranked by one metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingTable {
    /// Metric the records are ranked by.
    pub metric: MetricKind,

    /// Sort direction.
    pub order: SortOrder,

    /// Ranked records.
    pub rows: Vec<ScoredRecord>,
}

impl RankingTable {
    /// Create a ranking table.
    pub const fn new(metric: MetricKind, order: SortOrder, rows: Vec<ScoredRecord>) -> Self {
        Self { metric, order, rows }
    }

    fn title(&self) -> String {
        let direction = match self.order {
            SortOrder::Descending => "Top",
            SortOrder::Ascending => "Bottom",
        };
        format!("{direction} {} by {}", self.rows.len(), self.metric)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title()));
        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');
        output.push_str(&format!(
            "{:>4} {:<28} {:<20} {:>16} {:>16} {:>12}\n",
            "#", "Investment", "Fund", "Cost", "Fair Value", self.metric.to_string()
        ));
        output.push_str(&"-".repeat(WIDTH));
        output.push('\n');

        for (rank, scored) in self.rows.iter().enumerate() {
            output.push_str(&format!(
                "{:>4} {:<28} {:<20} {:>16} {:>16} {:>12}\n",
                rank + 1,
                scored.record.name,
                scored.record.fund,
                format_amount(scored.record.cost),
                format_amount(scored.record.fair_value),
                format_metric(self.metric, &scored.metrics)
            ));
        }

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", self.title()));
        output.push_str(&format!(
            "| # | Investment | Fund | Cost | Fair Value | {} |\n",
            self.metric
        ));
        output.push_str("|---|------------|------|------|------------|-----|\n");
        for (rank, scored) in self.rows.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                rank + 1,
                scored.record.name,
                scored.record.fund,
                format_amount(scored.record.cost),
                format_amount(scored.record.fair_value),
                format_metric(self.metric, &scored.metrics)
            ));
        }

        output
    }
}
