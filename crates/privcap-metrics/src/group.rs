//! Group-level metrics over a set of records.
//!
//! Records with non-positive cost are left out of every group figure. Group
//! IRR always comes from the merged cash-flow schedule of the group, never
//! from averaging per-record rates.

use privcap_data::InvestmentRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{MetricSet, MetricsEngine, moic, roi};
use crate::xirr::{CashFlow, IrrError, merge_cash_flows, xirr};

/// Realized and residual value over paid-in capital.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RealizationMultiples {
    /// Distributions (realized fair value) / paid-in capital
    pub dpi: Option<f64>,
    /// Residual (unrealized) fair value / paid-in capital
    pub rvpi: Option<f64>,
    /// DPI + RVPI
    pub tvpi: Option<f64>,
}

fn contributes(record: &InvestmentRecord) -> bool {
    record.cost > 0.0
}

/// Summed cost and fair value of the records with positive cost.
///
/// Group MOIC and ROI are ratios of these sums, so records with zero or
/// negative cost never enter them.
pub fn metric_basis(records: &[InvestmentRecord]) -> (f64, f64) {
    records
        .iter()
        .filter(|r| contributes(r))
        .fold((0.0, 0.0), |(c, v), r| (c + r.cost, v + r.fair_value))
}

/// Contribution and terminal-value flows for a group of records.
///
/// One `-cost` flow per record on its investment date plus a single terminal
/// flow of the summed fair value on `evaluation_date`, merged by date.
/// Records with non-positive cost or dated after `evaluation_date` are
/// skipped.
pub fn portfolio_cash_flows<'a>(
    records: impl IntoIterator<Item = &'a InvestmentRecord>,
    evaluation_date: chrono::NaiveDate,
) -> Vec<CashFlow> {
    let mut flows = Vec::new();
    let mut terminal = 0.0;

    for record in records {
        if !contributes(record) || record.investment_date > evaluation_date {
            continue;
        }
        flows.push(CashFlow::new(record.investment_date, -record.cost));
        terminal += record.fair_value;
    }

    if !flows.is_empty() {
        flows.push(CashFlow::new(evaluation_date, terminal));
    }
    merge_cash_flows(flows)
}

/// Cost-weighted average of the defined annualized ROIs.
///
/// Undefined when no contributing record has a defined value.
pub fn weighted_annualized_roi<'a>(
    pairs: impl IntoIterator<Item = (&'a InvestmentRecord, &'a MetricSet)>,
) -> Option<f64> {
    let (numerator, weight) = pairs
        .into_iter()
        .filter(|(record, _)| contributes(record))
        .filter_map(|(record, metrics)| metrics.annualized_roi.map(|ann| (ann, record.cost)))
        .fold((0.0, 0.0), |(num, den), (ann, cost)| (num + ann * cost, den + cost));

    if weight <= 0.0 {
        return None;
    }
    let value = numerator / weight;
    value.is_finite().then_some(value)
}

/// DPI, RVPI and TVPI; `None` when no record carries a realized flag.
///
/// Records without a flag count as unrealized once any flag is present.
pub fn realization_multiples(records: &[InvestmentRecord]) -> Option<RealizationMultiples> {
    if records.iter().all(|r| r.realized.is_none()) {
        return None;
    }

    let mut paid_in = 0.0;
    let mut realized = 0.0;
    let mut residual = 0.0;
    for record in records.iter().filter(|r| contributes(r)) {
        paid_in += record.cost;
        if record.realized == Some(true) {
            realized += record.fair_value;
        } else {
            residual += record.fair_value;
        }
    }

    if paid_in <= 0.0 {
        return Some(RealizationMultiples::default());
    }
    let dpi = realized / paid_in;
    let rvpi = residual / paid_in;
    Some(RealizationMultiples {
        dpi: Some(dpi),
        rvpi: Some(rvpi),
        tvpi: Some(dpi + rvpi),
    })
}

impl MetricsEngine {
    /// IRR of the merged cash-flow schedule of `records`.
    ///
    /// # Errors
    ///
    /// Returns the solver error when the schedule has no solution, for
    /// example when every record has non-positive cost.
    pub fn portfolio_irr(&self, records: &[InvestmentRecord]) -> Result<f64, IrrError> {
        let flows = portfolio_cash_flows(records, self.evaluation_date());
        xirr(&flows, self.solver())
    }

    /// Group MOIC and ROI from summed cost and fair value, weighted
    /// annualized ROI, and merged-cash-flow IRR.
    pub fn group_metrics(&self, records: &[InvestmentRecord]) -> MetricSet {
        let (cost, fair_value) = metric_basis(records);

        let metrics: Vec<MetricSet> = records.iter().map(|r| self.evaluate(r)).collect();
        let annualized_roi = weighted_annualized_roi(records.iter().zip(metrics.iter()));

        let irr = match self.portfolio_irr(records) {
            Ok(rate) => Some(rate),
            Err(err) => {
                debug!(records = records.len(), error = %err, "group IRR undefined");
                None
            }
        };

        MetricSet {
            moic: moic(cost, fair_value),
            roi: roi(cost, fair_value),
            annualized_roi,
            irr,
        }
    }
}
