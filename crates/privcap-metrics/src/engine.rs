//! Per-record return metrics.
//!
//! Every guard (non-positive cost, non-positive holding period, a result that
//! is not finite) produces `None` rather than an error or a silent zero.

use chrono::NaiveDate;
use privcap_data::InvestmentRecord;
use serde::{Deserialize, Serialize};

use crate::horizon::Horizon;
use crate::registry::MetricKind;
use crate::xirr::{DAYS_PER_YEAR, SolverConfig};

/// Derived metrics for one record or one group. `None` marks an undefined
/// value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Fair value / cost
    pub moic: Option<f64>,
    /// (fair value - cost) / cost
    pub roi: Option<f64>,
    /// ROI / holding years
    pub annualized_roi: Option<f64>,
    /// Internal rate of return
    pub irr: Option<f64>,
}

impl MetricSet {
    /// Value of one metric.
    pub const fn get(&self, kind: MetricKind) -> Option<f64> {
        kind.value(self)
    }

    /// Metrics that are undefined in this set.
    pub fn undefined(&self) -> impl Iterator<Item = MetricKind> + '_ {
        MetricKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_none())
    }
}

/// A record paired with its metrics. The record is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// Source record
    pub record: InvestmentRecord,
    /// Metrics derived from it
    pub metrics: MetricSet,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Multiple on invested capital; undefined for non-positive cost.
pub fn moic(cost: f64, fair_value: f64) -> Option<f64> {
    if cost <= 0.0 {
        return None;
    }
    finite(fair_value / cost)
}

/// Return on investment; undefined for non-positive cost.
pub fn roi(cost: f64, fair_value: f64) -> Option<f64> {
    if cost <= 0.0 {
        return None;
    }
    finite((fair_value - cost) / cost)
}

/// Whole days between investment and evaluation.
pub fn days_held(investment_date: NaiveDate, evaluation_date: NaiveDate) -> i64 {
    (evaluation_date - investment_date).num_days()
}

/// ROI divided by holding years, with the period capped by `horizon`.
///
/// Undefined when the actual holding period is not positive.
pub fn annualized_roi(roi: Option<f64>, days_held: i64, horizon: Horizon) -> Option<f64> {
    if days_held <= 0 {
        return None;
    }
    let years = horizon.capped_days(days_held) as f64 / DAYS_PER_YEAR;
    finite(roi? / years)
}

/// IRR of a single `-cost` then `+fair_value` pair, in closed form.
pub fn two_flow_irr(cost: f64, fair_value: f64, days_held: i64) -> Option<f64> {
    if cost <= 0.0 || days_held <= 0 || fair_value < 0.0 {
        return None;
    }
    finite((fair_value / cost).powf(DAYS_PER_YEAR / days_held as f64) - 1.0)
}

/// Computes metrics against a fixed evaluation date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsEngine {
    evaluation_date: NaiveDate,
    horizon: Horizon,
    solver: SolverConfig,
}

impl MetricsEngine {
    /// Create an engine with the since-inception horizon and default solver.
    pub fn new(evaluation_date: NaiveDate) -> Self {
        Self {
            evaluation_date,
            horizon: Horizon::default(),
            solver: SolverConfig::default(),
        }
    }

    /// Use a different annualization horizon.
    pub const fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    /// Use a different solver configuration.
    pub const fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Evaluation ("today") date.
    pub const fn evaluation_date(&self) -> NaiveDate {
        self.evaluation_date
    }

    /// Annualization horizon.
    pub const fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Solver configuration.
    pub const fn solver(&self) -> &SolverConfig {
        &self.solver
    }

    /// Metrics for one record.
    pub fn evaluate(&self, record: &InvestmentRecord) -> MetricSet {
        let days = days_held(record.investment_date, self.evaluation_date);
        let roi = roi(record.cost, record.fair_value);

        MetricSet {
            moic: moic(record.cost, record.fair_value),
            roi,
            annualized_roi: annualized_roi(roi, days, self.horizon),
            irr: two_flow_irr(record.cost, record.fair_value, days),
        }
    }

    /// Pair every record with its metrics, preserving order.
    pub fn score(&self, records: &[InvestmentRecord]) -> Vec<ScoredRecord> {
        records
            .iter()
            .map(|record| ScoredRecord {
                record: record.clone(),
                metrics: self.evaluate(record),
            })
            .collect()
    }
}
