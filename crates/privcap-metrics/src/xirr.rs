//! Internal rate of return over dated cash flows (XIRR).
//!
//! The rate `r` solves
//!
//! NPV(r) = Σ cf_i / (1 + r)^((d_i - d_0) / 365.25) = 0
//!
//! where `d_0` is the earliest cash-flow date. Newton-Raphson runs first from
//! the configured guess; if it stalls or leaves the domain `r > -1`, the
//! solver brackets a sign change and bisects. Both phases are capped by
//! [`SolverConfig::max_iterations`].
//!
//! IRR is invariant to scaling the cash flows, so amounts are divided by the
//! largest magnitude before solving and the NPV tolerance is relative to that.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Day-count basis used for year fractions.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Lowest rate the bisection bracket will probe (-99.99%).
const BRACKET_FLOOR: f64 = -0.9999;

/// Highest rate the bisection bracket will expand to.
const BRACKET_CEILING: f64 = 1.0e6;

/// Errors from the IRR solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IrrError {
    /// Fewer than two cash flows
    #[error("Insufficient cash flows: need at least 2, got {0}")]
    InsufficientCashFlows(usize),

    /// Every cash flow has the same sign, so no real rate exists
    #[error("Cash flows never change sign")]
    NoSignChange,

    /// Tolerance not reached within the iteration cap
    #[error("IRR did not converge after {iterations} iterations")]
    DidNotConverge {
        /// Total iterations spent
        iterations: usize,
    },
}

/// A signed, dated cash flow. Negative amounts are contributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Date of the flow
    pub date: NaiveDate,
    /// Signed amount
    pub amount: f64,
}

impl CashFlow {
    /// Create a new cash flow.
    pub const fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Solver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration cap per phase (default: 100)
    pub max_iterations: usize,
    /// Absolute NPV tolerance on normalized flows (default: 1e-7)
    pub tolerance: f64,
    /// Newton starting rate (default: 0.1)
    pub initial_guess: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-7,
            initial_guess: 0.1,
        }
    }
}

/// Merge flows that fall on the same date and sort them chronologically.
pub fn merge_cash_flows(flows: impl IntoIterator<Item = CashFlow>) -> Vec<CashFlow> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for flow in flows {
        *by_date.entry(flow.date).or_insert(0.0) += flow.amount;
    }
    by_date
        .into_iter()
        .map(|(date, amount)| CashFlow { date, amount })
        .collect()
}

/// Net present value of dated flows at `rate`, discounted to the earliest date.
pub fn npv(rate: f64, flows: &[CashFlow]) -> f64 {
    let timed = year_fractions(flows);
    npv_at(rate, &timed)
}

/// Solve for the IRR of dated cash flows.
///
/// # Errors
///
/// See [`IrrError`].
pub fn xirr(flows: &[CashFlow], config: &SolverConfig) -> Result<f64, IrrError> {
    irr_from_year_fractions(&year_fractions(flows), config)
}

/// Solve for the IRR of `(years_from_start, amount)` pairs.
///
/// # Errors
///
/// See [`IrrError`].
pub fn irr_from_year_fractions(
    flows: &[(f64, f64)],
    config: &SolverConfig,
) -> Result<f64, IrrError> {
    if flows.len() < 2 {
        return Err(IrrError::InsufficientCashFlows(flows.len()));
    }

    let has_inflow = flows.iter().any(|(_, cf)| *cf > 0.0);
    let has_outflow = flows.iter().any(|(_, cf)| *cf < 0.0);
    if !(has_inflow && has_outflow) {
        return Err(IrrError::NoSignChange);
    }

    let scale = flows.iter().map(|(_, cf)| cf.abs()).fold(0.0, f64::max);
    let normalized: Vec<(f64, f64)> = flows.iter().map(|(t, cf)| (*t, cf / scale)).collect();

    let (newton, newton_iterations) = newton(&normalized, config);
    if let Some(rate) = newton {
        return Ok(rate);
    }

    match bisect(&normalized, config) {
        (Some(rate), _) => Ok(rate),
        (None, iterations) => {
            tracing::debug!(
                iterations = newton_iterations + iterations,
                "IRR solver did not converge"
            );
            Err(IrrError::DidNotConverge {
                iterations: newton_iterations + iterations,
            })
        }
    }
}

fn year_fractions(flows: &[CashFlow]) -> Vec<(f64, f64)> {
    let Some(start) = flows.iter().map(|f| f.date).min() else {
        return Vec::new();
    };
    flows
        .iter()
        .map(|f| ((f.date - start).num_days() as f64 / DAYS_PER_YEAR, f.amount))
        .collect()
}

fn npv_at(rate: f64, flows: &[(f64, f64)]) -> f64 {
    let base = 1.0 + rate;
    flows.iter().map(|(t, cf)| cf * base.powf(-t)).sum()
}

fn npv_derivative(rate: f64, flows: &[(f64, f64)]) -> f64 {
    let base = 1.0 + rate;
    flows.iter().map(|(t, cf)| -t * cf * base.powf(-t - 1.0)).sum()
}

fn newton(flows: &[(f64, f64)], config: &SolverConfig) -> (Option<f64>, usize) {
    let mut rate = config.initial_guess;

    for iteration in 0..config.max_iterations {
        let value = npv_at(rate, flows);
        if !value.is_finite() {
            return (None, iteration);
        }
        if value.abs() < config.tolerance {
            return (Some(rate), iteration);
        }

        let slope = npv_derivative(rate, flows);
        if slope == 0.0 || !slope.is_finite() {
            return (None, iteration);
        }

        let mut next = rate - value / slope;
        if !next.is_finite() {
            return (None, iteration);
        }
        // Stay inside the domain by stepping halfway towards -1.
        if next <= -1.0 {
            next = (rate - 1.0) / 2.0;
        }
        rate = next;
    }

    let value = npv_at(rate, flows);
    if value.abs() < config.tolerance {
        (Some(rate), config.max_iterations)
    } else {
        (None, config.max_iterations)
    }
}

fn bisect(flows: &[(f64, f64)], config: &SolverConfig) -> (Option<f64>, usize) {
    let mut lo = BRACKET_FLOOR;
    let mut f_lo = npv_at(lo, flows);
    let mut hi = 1.0;
    let mut f_hi = npv_at(hi, flows);
    let mut iterations = 0;

    while f_lo.signum() == f_hi.signum() {
        if hi >= BRACKET_CEILING || iterations >= config.max_iterations {
            return (None, iterations);
        }
        lo = hi;
        f_lo = f_hi;
        hi *= 4.0;
        f_hi = npv_at(hi, flows);
        iterations += 1;
    }
    if f_lo.is_nan() || f_hi.is_nan() {
        return (None, iterations);
    }

    for _ in 0..config.max_iterations {
        iterations += 1;
        let mid = 0.5 * (lo + hi);
        let f_mid = npv_at(mid, flows);

        if f_mid.abs() < config.tolerance || (hi - lo) < 1e-12 {
            return (Some(mid), iterations);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    (None, iterations)
}
