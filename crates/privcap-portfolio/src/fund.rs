//! Per-fund aggregation.

use privcap_data::InvestmentRecord;
use privcap_metrics::{MetricSet, MetricsEngine, metric_basis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Totals and group metrics for one fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundAggregate {
    /// Fund name
    pub fund_name: String,
    /// Number of records in the fund
    pub record_count: usize,
    /// Sum of cost over all records
    pub total_cost: f64,
    /// Sum of fair value over all records
    pub total_fair_value: f64,
    /// Cost of the positive-cost records, the denominator of MOIC and ROI
    pub basis_cost: f64,
    /// Fair value of the positive-cost records, the numerator of MOIC
    pub basis_fair_value: f64,
    /// Group MOIC/ROI, weighted annualized ROI and merged-cash-flow IRR
    pub metrics: MetricSet,
}

impl FundAggregate {
    /// Whether some records are left out of MOIC and ROI for having no
    /// positive cost.
    pub fn excludes_records(&self) -> bool {
        self.basis_cost != self.total_cost || self.basis_fair_value != self.total_fair_value
    }
}

/// Group records by fund name, sorted by name.
pub fn group_by_fund(records: &[InvestmentRecord]) -> BTreeMap<&str, Vec<InvestmentRecord>> {
    let mut groups: BTreeMap<&str, Vec<InvestmentRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.fund.as_str())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// One aggregate per distinct fund, sorted by fund name.
pub fn aggregate_by_fund(records: &[InvestmentRecord], engine: &MetricsEngine) -> Vec<FundAggregate> {
    let aggregates: Vec<FundAggregate> = group_by_fund(records)
        .into_iter()
        .map(|(fund, members)| {
            let (basis_cost, basis_fair_value) = metric_basis(&members);
            FundAggregate {
                fund_name: fund.to_string(),
                record_count: members.len(),
                total_cost: members.iter().map(|r| r.cost).sum(),
                total_fair_value: members.iter().map(|r| r.fair_value).sum(),
                basis_cost,
                basis_fair_value,
                metrics: engine.group_metrics(&members),
            }
        })
        .collect();

    debug!(funds = aggregates.len(), records = records.len(), "aggregated by fund");
    aggregates
}
