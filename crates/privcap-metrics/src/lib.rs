#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/privcap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod engine;
pub mod group;
pub mod horizon;
pub mod registry;
pub mod xirr;

// Re-export main types
pub use engine::{
    MetricSet, MetricsEngine, ScoredRecord, annualized_roi, days_held, moic, roi, two_flow_irr,
};
pub use group::{
    RealizationMultiples, metric_basis, portfolio_cash_flows, realization_multiples,
    weighted_annualized_roi,
};
pub use horizon::{Horizon, ParseHorizonError};
pub use registry::{MetricInfo, MetricKind, UnknownMetric, available_metrics, get_metric_info};
pub use xirr::{
    CashFlow, DAYS_PER_YEAR, IrrError, SolverConfig, irr_from_year_fractions, merge_cash_flows,
    npv, xirr,
};
