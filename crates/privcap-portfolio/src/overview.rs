//! Whole-portfolio summary.

use chrono::NaiveDate;
use privcap_data::InvestmentRecord;
use privcap_metrics::{MetricKind, MetricSet, MetricsEngine, RealizationMultiples, realization_multiples};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Totals and group metrics across every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioOverview {
    /// Evaluation date the metrics were computed against
    pub evaluation_date: NaiveDate,
    /// Number of records
    pub record_count: usize,
    /// Number of distinct funds
    pub fund_count: usize,
    /// Sum of cost
    pub total_cost: f64,
    /// Sum of fair value
    pub total_fair_value: f64,
    /// Portfolio-level metrics
    pub metrics: MetricSet,
    /// DPI/RVPI/TVPI, present only when some record carries a realized flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realization: Option<RealizationMultiples>,
    /// Earliest investment date
    pub first_investment: Option<NaiveDate>,
    /// Latest investment date
    pub last_investment: Option<NaiveDate>,
    /// Records whose metric is undefined, per metric
    pub undefined_counts: BTreeMap<MetricKind, usize>,
}

impl PortfolioOverview {
    /// Unrealized gain, fair value minus cost.
    pub fn total_gain(&self) -> f64 {
        self.total_fair_value - self.total_cost
    }
}

/// Count records with an undefined value, per metric. Every metric is present.
pub fn undefined_counts<'a>(
    metrics: impl IntoIterator<Item = &'a MetricSet>,
) -> BTreeMap<MetricKind, usize> {
    let mut counts: BTreeMap<MetricKind, usize> =
        MetricKind::ALL.into_iter().map(|kind| (kind, 0)).collect();
    for set in metrics {
        for kind in set.undefined() {
            *counts.entry(kind).or_insert(0) += 1;
        }
    }
    counts
}

/// Summarize `records` against the engine's evaluation date.
pub fn overview(records: &[InvestmentRecord], engine: &MetricsEngine) -> PortfolioOverview {
    let per_record: Vec<MetricSet> = records.iter().map(|r| engine.evaluate(r)).collect();
    let funds: BTreeSet<&str> = records.iter().map(|r| r.fund.as_str()).collect();

    PortfolioOverview {
        evaluation_date: engine.evaluation_date(),
        record_count: records.len(),
        fund_count: funds.len(),
        total_cost: records.iter().map(|r| r.cost).sum(),
        total_fair_value: records.iter().map(|r| r.fair_value).sum(),
        metrics: engine.group_metrics(records),
        realization: realization_multiples(records),
        first_investment: records.iter().map(|r| r.investment_date).min(),
        last_investment: records.iter().map(|r| r.investment_date).max(),
        undefined_counts: undefined_counts(&per_record),
    }
}
